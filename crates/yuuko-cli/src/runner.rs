//! runner.rs — Lance l'interpréteur Python sur le fichier généré.
//!
//! Flux hérités (stdin/stdout/stderr) ; le code de sortie est rendu tel quel.

use std::process::{Command, ExitStatus};

use camino::Utf8Path;
use color_eyre::eyre::{Result, WrapErr};
use log::debug;
use yuuko_core::Config;

#[derive(Debug, Clone)]
pub struct Interpreter {
    bin: String,
}

impl Interpreter {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.interpreter.clone())
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// `<bin> <script>` ; attend la fin du processus.
    pub fn run(&self, script: &Utf8Path) -> Result<ExitStatus> {
        debug!("exécution: {} {script}", self.bin);
        Command::new(&self.bin)
            .arg(script.as_std_path())
            .status()
            .wrap_err_with(|| format!("falha ao executar `{} {script}`", self.bin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[cfg(unix)]
    #[test]
    fn exit_code_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let script = Utf8PathBuf::from_path_buf(dir.path().join("s.py")).unwrap();
        std::fs::write(&script, "exit 3\n").unwrap();
        let status = Interpreter::new("sh").run(&script).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn missing_binary_is_an_error() {
        let i = Interpreter::new("yuuko-interpretador-inexistente");
        let err = i.run(Utf8Path::new("x.py")).unwrap_err();
        assert!(err.to_string().contains("yuuko-interpretador-inexistente"));
    }

    #[test]
    fn from_config_uses_interpreter() {
        let cfg = Config { interpreter: "python3".into(), ..Config::default() };
        assert_eq!(Interpreter::from_config(&cfg).bin(), "python3");
    }
}
