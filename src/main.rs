mod config;
mod error;
mod library;
mod player;
mod playlist;
mod runtime;
#[cfg(test)]
mod testutil;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
