#![forbid(unsafe_code)]

#[cfg(not(target_arch = "wasm32"))]
use offload::{config::ContentStore, config::LocalConfig, engine::tracing, State};

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[cfg(not(target_arch = "wasm32"))]
const USAGE: &str = "usage:
    offload permute <n> [--inline]
    offload compare <n>
    offload grayscale <input> <output>";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let content_store = ContentStore::default();
    content_store.create_req_dirs()?;

    let log_file = content_store.log_file();
    let term_logger = fmt::layer().with_writer(std::io::stderr);
    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or_else(|| std::path::Path::new(".")),
        log_file.file_name().unwrap_or_else(|| "log".as_ref()),
    );
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    let file_logger = fmt::layer().with_ansi(false).with_writer(non_blocking);

    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(term_logger)
        .with(file_logger)
        .init();

    // loaded after the subscriber is up so config warnings get logged
    let config = LocalConfig::load_from(&content_store);
    if !from_env {
        if let Err(err) = filter_handle.reload(EnvFilter::new(config.log_directives())) {
            tracing::error!("failed to apply configured log filter: {}", err);
        }
    }
    if !content_store.config_file("config").exists() {
        config.store_in(&content_store)?;
    }
    tracing::debug!("using config {:?}", config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut state = State::new(config);

    rt.block_on(cli::run(&mut state, &args))
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use anyhow::{anyhow, bail, ensure, Context};
    use offload::{
        engine::{Image, PixelBuffer},
        permutations_inline, permutations_offloaded, State,
    };

    use super::USAGE;

    pub async fn run(state: &mut State, args: &[&str]) -> anyhow::Result<()> {
        match args {
            ["permute", n, rest @ ..] => {
                let n = parse_size(n)?;
                match rest {
                    [] => state.permute_offloaded(n),
                    ["--inline"] => state.permute_inline(n),
                    _ => bail!(USAGE),
                }
                while state.is_busy() {
                    state.wait_and_maintain().await;
                }
                report_errors(state)?;
                for line in state.permutation_results() {
                    println!("{}", line);
                }
                Ok(())
            }
            ["compare", n] => {
                let n = parse_size(n)?;
                let limit = state.config.permutation_limit();
                let inline = permutations_inline(n, limit)?;
                let offloaded = permutations_offloaded(n, limit).await?;
                ensure!(inline == offloaded, "inline and offloaded results differ for n = {}", n);
                println!("{} permutations, identical in both modes", inline.len());
                Ok(())
            }
            ["grayscale", input, output] => {
                let decoded = image::open(input)
                    .with_context(|| format!("failed to open {}", input))?
                    .to_rgba8();
                let (width, height) = decoded.dimensions();
                let source = Image::new(width, height, PixelBuffer::new(decoded.into_raw())?)?;

                state.grayscale(*input, source);
                while state.is_busy() {
                    state.wait_and_maintain().await;
                }
                report_errors(state)?;

                let converted = state
                    .converted_image(input)
                    .ok_or_else(|| anyhow!("no output for {}", input))?;
                let buffer = image::RgbaImage::from_raw(
                    converted.width,
                    converted.height,
                    converted.pixels.as_bytes().to_vec(),
                )
                .ok_or_else(|| anyhow!("converted buffer doesn't match {}x{}", width, height))?;
                buffer
                    .save(output)
                    .with_context(|| format!("failed to write {}", output))?;
                Ok(())
            }
            _ => bail!(USAGE),
        }
    }

    fn parse_size(raw: &str) -> anyhow::Result<i64> {
        raw.parse().with_context(|| format!("'{}' is not an integer", raw))
    }

    fn report_errors(state: &State) -> anyhow::Result<()> {
        match state.latest_errors().first() {
            Some(err) => Err(anyhow!("{}", err)),
            None => Ok(()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}
