use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{eyre, Result, WrapErr};
use yuuko_core::Config;

/// Extension attendue des sources du dialecte.
pub const SOURCE_EXT: &str = "yl";

pub fn write(path: &Utf8Path, s: &str) -> Result<()> {
    if let Some(p) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(p).wrap_err_with(|| format!("criação de {p}"))?;
    }
    fs::write(path, s).wrap_err_with(|| format!("escrita de {path}"))
}

pub fn change_ext(path: &Utf8Path, ext: &str) -> Utf8PathBuf {
    path.with_extension(ext)
}

/// Le fichier existe et porte l'extension `.yl`.
pub fn ensure_source(path: &Utf8Path) -> Result<()> {
    if path.is_file() && path.extension() == Some(SOURCE_EXT) {
        Ok(())
    } else {
        Err(eyre!("Arquivo inválido: {path}"))
    }
}

/// Config TOML : mêmes clés que `yuuko_core::Config`, toutes facultatives.
pub fn read_config(path: &Utf8Path) -> Result<Config> {
    let s = fs::read_to_string(path).wrap_err_with(|| format!("leitura de {path}"))?;
    let cfg: Config = toml::from_str(&s).wrap_err_with(|| format!("TOML inválido: {path}"))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(p: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(p.to_path_buf()).unwrap()
    }

    #[test]
    fn ext_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        let src = root.join("a/b/prog.yl");
        assert!(ensure_source(&src).is_err());
        write(&src, "x = 1\n").unwrap();
        assert!(ensure_source(&src).is_ok());
        assert_eq!(change_ext(&src, "py"), root.join("a/b/prog.py"));

        let txt = root.join("prog.txt");
        write(&txt, "").unwrap();
        assert_eq!(ensure_source(&txt).unwrap_err().to_string(), format!("Arquivo inválido: {txt}"));
    }

    #[test]
    fn toml_config_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = utf8(dir.path()).join("yuuko.toml");
        write(&path, "interpreter = \"python3\"\n\n[limits]\nmax_literals = 10\n").unwrap();
        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.interpreter, "python3");
        assert_eq!(cfg.limits.max_literals, 10);
        assert_eq!(cfg.limits.max_input_bytes, Config::default().limits.max_input_bytes);
        assert_eq!(cfg.display_directive, "mostrar");

        write(&path, "interpreter = [").unwrap();
        assert!(read_config(&path).is_err());
    }
}
