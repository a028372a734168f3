//! Standalone orbis viewer.

use std::path::Path;
use std::sync::Arc;

use orbis::model::source::is_url;
use orbis::model::{AssetSource, FileSource, HttpSource};
use orbis::options::Options;
use orbis::Viewer;

const USAGE: &str = "Usage: orbis [MODEL_PATH_OR_URL] [--options FILE.toml]";

struct Args {
    model: Option<String>,
    options: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        model: None,
        options: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" | "-o" => {
                parsed.options = Some(
                    args.next().ok_or("--options needs a file argument")?,
                );
            }
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ if parsed.model.is_none() => parsed.model = Some(arg),
            _ => return Err(format!("Unexpected argument: {arg}\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn source_for(model: &str) -> Arc<dyn AssetSource> {
    if is_url(model) {
        Arc::new(HttpSource::default())
    } else {
        Arc::new(FileSource::default())
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut options = match &args.options {
        Some(path) => match Options::load(Path::new(path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };
    if let Some(model) = args.model {
        options.model.path = model;
    }

    let source = source_for(&options.model.path);
    let viewer = Viewer::builder()
        .with_options(options)
        .with_source(source)
        .build();
    if let Err(e) = viewer.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
