mod audio;
mod led;
mod multi_channel;

use std::path::Path;
use std::rc::Rc;

use itertools::Itertools;
use pdmflow::{Module, Package, PackageError, Simulator};
use pdmflow_std::ConfigError;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let led = Rc::new(led::m()?);
    let audio = Rc::new(audio::m()?);
    let (counter, channels) = multi_channel::m()?;
    let counter = Rc::new(counter);
    let channels = channels.into_iter().map(Rc::new).collect::<Vec<_>>();

    let mut sim = Simulator::new();
    sim.add(led.clone());
    sim.add(counter.clone());
    for channel in &channels {
        sim.add(channel.clone());
    }

    let sys = led.domain().clone();
    let mut led_out = vec![];
    for _ in 0..led.period() {
        sim.tick(&sys);
        led_out.push(led.out().get());
    }
    info!(
        duty = led.effective_duty(),
        high = led_out.iter().sum::<u64>(),
        head = %led_out.iter().take(32).join(""),
        "pdm_led period"
    );
    for channel in &channels {
        info!(name = channel.name(), duty = channel.effective_duty(), out = channel.out().get(), "channel");
    }

    let mut package = Package::default();
    package.add(led);
    package.add(audio);
    package.add(counter);
    for channel in channels {
        package.add(channel);
    }
    package.gen_vir(Path::new("./build"))?;

    Ok(())
}
