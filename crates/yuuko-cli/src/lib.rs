//! yuuko-cli/src/lib.rs — CLI YuukoLane
//!
//!   yuuko <arquivo.yl> [--so-transpilar] [--debug] [-v…]
//!         [--config F] [--dicionario F] [--python BIN] [--aspas-estritas]
//!
//! 1. vérifie la source (existe, extension `.yl`)
//! 2. config : defaults < TOML (`--config`) < ENV `YUUKO_*` < flags
//! 3. traduit (yuuko-core), écrit `<arquivo>.py` à côté de la source
//! 4. sauf `--so-transpilar`, lance `<python> <arquivo>.py` et rend son code de sortie
//!
//! Toute erreur remonte en `eyre::Report` ; `main` l'affiche en une ligne `[ERRO] …`.

pub mod runner;
pub mod util;

use std::path::PathBuf;

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use log::{info, LevelFilter};
use yuuko_core::{CliOverrides, Config, Translator};

use crate::runner::Interpreter;

#[derive(Parser, Debug)]
#[command(name = "yuuko", version, about = "Transpila e executa código YuukoLane (.yl)")]
pub struct Cli {
    /// Caminho do arquivo .yl
    pub arquivo: PathBuf,

    /// Só transpilar, não executar
    #[arg(long, visible_alias = "transpile-only")]
    pub so_transpilar: bool,

    /// Mostrar código transpilado antes de executar
    #[arg(long)]
    pub debug: bool,

    /// Verbosidade (repetir para mais detalhes ; RUST_LOG tem prioridade)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Arquivo de configuração TOML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dicionário JSON alternativo
    #[arg(long)]
    pub dicionario: Option<PathBuf>,

    /// Interpretador Python a usar
    #[arg(long)]
    pub python: Option<String>,

    /// Literal não terminado é erro
    #[arg(long)]
    pub aspas_estritas: bool,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            strict_quotes: self.aspas_estritas.then_some(true),
            dictionary: self.dicionario.clone(),
            interpreter: self.python.clone(),
            ..CliOverrides::default()
        }
    }
}

/// `-v` → info, `-vv` → debug, `-vvv` → trace ; `RUST_LOG` l'emporte.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    // déjà initialisé (tests) : on garde l'existant
    let _ = builder.try_init();
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(p) => util::read_config(&utf8(p.clone())?)?,
        None => Config::default(),
    };
    cfg.apply_env();
    cfg.apply_cli_overrides(&cli.overrides());
    cfg.validate().map_err(|e| eyre!("configuração inválida: {e}"))?;
    Ok(cfg)
}

/// Exécute la commande ; renvoie le code de sortie du processus.
pub fn run(cli: &Cli) -> Result<i32> {
    let arquivo = utf8(cli.arquivo.clone())?;
    util::ensure_source(&arquivo)?;

    let cfg = load_config(cli)?;
    let dict = cfg.load_dictionary()?;
    let translator = Translator::new(&dict, cfg.clone());
    let codigo_py = translator.translate_file(&arquivo)?;

    if cli.debug {
        println!("📜 Código transpilado:\n");
        println!("{codigo_py}");
        println!("\n🔚 Fim da transpilação\n");
    }

    let saida = util::change_ext(&arquivo, "py");
    util::write(&saida, &codigo_py)?;
    println!("[OK] Transpilação concluída: {saida}");

    if cli.so_transpilar {
        return Ok(0);
    }

    println!("\n🚀 Executando {saida}:\n");
    let status = Interpreter::from_config(&cfg).run(&saida)?;
    info!("{} terminé: {status}", cfg.interpreter);
    Ok(status.code().unwrap_or(1))
}

fn utf8(p: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(p).map_err(|p| eyre!("Arquivo inválido: {}", p.display()))
}
