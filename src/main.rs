mod app;
mod catalog;
mod config;
mod lookup;
mod playback;
mod runtime;
mod store;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
