use paynote_core::Config;

// mimalloc keeps fragmentation low on musl-based container images
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (state, router) = paynote_api::setup::initialize_app(config.clone()).await?;

    paynote_api::setup::server::start_server(&config, router, state.background.clone()).await?;

    Ok(())
}
