//! Posts randomized sensor readings to a running plantmon-server, for
//! demos and manual alert-pipeline testing.

use anyhow::{bail, Result};
use plantmon_common::types::ReadingSubmission;
use rand::Rng;
use std::env;
use tokio::time::{sleep, Duration};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scenario {
    Normal,
    GasSpike,
    Recovery,
}

impl Scenario {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "normal" => Ok(Self::Normal),
            "gas-spike" => Ok(Self::GasSpike),
            "recovery" => Ok(Self::Recovery),
            _ => bail!("unknown scenario: {value}"),
        }
    }

    fn names() -> &'static [&'static str] {
        &["normal", "gas-spike", "recovery"]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::GasSpike => "gas-spike",
            Self::Recovery => "recovery",
        }
    }
}

#[derive(Debug)]
struct Config {
    endpoint: String,
    scenario: Scenario,
    device_count: usize,
    device_prefix: String,
    interval_ms: u64,
    rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            scenario: Scenario::Normal,
            device_count: 4,
            device_prefix: "SENSOR".to_string(),
            interval_ms: 1000,
            rounds: 0,
        }
    }
}

enum CliAction {
    Run(Config),
    Help,
    ListScenarios,
}

fn usage() {
    println!(
        "Usage:\n  plantmon-simulator [options]\n\nOptions:\n  --endpoint <url>         server base URL (default: http://127.0.0.1:8000)\n  --scenario <name>        normal|gas-spike|recovery (default: normal)\n  --device-count <n>       simulated device count (default: 4)\n  --device-prefix <prefix> device id prefix (default: SENSOR)\n  --interval-ms <n>        pause between rounds (default: 1000)\n  --rounds <n>             rounds to send, 0 = run forever (default: 0)\n  --list-scenarios         print supported scenarios\n  -h, --help               show this help"
    );
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}

fn parse_positive_usize(value: &str, flag: &str) -> Result<usize> {
    let parsed: usize = value
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag} expects a number, got '{value}'"))?;
    if parsed == 0 {
        bail!("{flag} must be at least 1");
    }
    Ok(parsed)
}

fn parse_cli() -> Result<CliAction> {
    let mut config = Config::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "--list-scenarios" => return Ok(CliAction::ListScenarios),
            "--endpoint" => {
                config.endpoint = next_value(&mut args, "--endpoint")?;
            }
            "--scenario" => {
                let value = next_value(&mut args, "--scenario")?;
                config.scenario = Scenario::parse(&value)?;
            }
            "--device-count" => {
                let value = next_value(&mut args, "--device-count")?;
                config.device_count = parse_positive_usize(&value, "--device-count")?;
            }
            "--device-prefix" => {
                config.device_prefix = next_value(&mut args, "--device-prefix")?;
            }
            "--interval-ms" => {
                let value = next_value(&mut args, "--interval-ms")?;
                config.interval_ms = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("--interval-ms expects a number, got '{value}'"))?;
            }
            "--rounds" => {
                let value = next_value(&mut args, "--rounds")?;
                config.rounds = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("--rounds expects a number, got '{value}'"))?;
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
    }

    Ok(CliAction::Run(config))
}

/// One reading for one device, shaped by the scenario and the round
/// counter.
fn generate_reading(
    rng: &mut impl Rng,
    scenario: Scenario,
    device_id: &str,
    round: usize,
) -> ReadingSubmission {
    let (temperature, gas_level) = match scenario {
        // Unremarkable plant floor: values roam the full nominal-to-warning band
        Scenario::Normal => (rng.gen_range(25.0..95.0), rng.gen_range(40.0..450.0)),
        // Calm gas baseline with a hard spike every 12th round, enough to
        // trip both the threshold and the window detector
        Scenario::GasSpike => {
            let gas = if round > 0 && round % 12 == 0 {
                rng.gen_range(650.0..900.0)
            } else {
                rng.gen_range(90.0..110.0)
            };
            (rng.gen_range(20.0..30.0), gas)
        }
        // Alternating hot and nominal phases to exercise auto-resolution
        Scenario::Recovery => {
            if (round / 6) % 2 == 0 {
                (rng.gen_range(82.0..95.0), rng.gen_range(620.0..800.0))
            } else {
                (rng.gen_range(20.0..40.0), rng.gen_range(50.0..250.0))
            }
        }
    };

    ReadingSubmission {
        device_id: device_id.to_string(),
        temperature: (temperature * 100.0_f64).round() / 100.0,
        gas_level: (gas_level * 100.0_f64).round() / 100.0,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("plantmon_simulator=info".parse()?),
        )
        .init();

    let config = match parse_cli()? {
        CliAction::Help => {
            usage();
            return Ok(());
        }
        CliAction::ListScenarios => {
            for name in Scenario::names() {
                println!("{name}");
            }
            return Ok(());
        }
        CliAction::Run(config) => config,
    };

    let devices: Vec<String> = (1..=config.device_count)
        .map(|i| format!("{}_{i:02}", config.device_prefix))
        .collect();
    let url = format!("{}/sensor-data", config.endpoint.trim_end_matches('/'));
    let client = reqwest::Client::new();

    tracing::info!(
        endpoint = %url,
        scenario = %config.scenario.as_str(),
        devices = devices.len(),
        interval_ms = config.interval_ms,
        "plantmon-simulator starting"
    );

    let mut rng = rand::thread_rng();
    let mut round = 0usize;
    loop {
        for device_id in &devices {
            let reading = generate_reading(&mut rng, config.scenario, device_id, round);
            match client.post(&url).json(&reading).send().await {
                Ok(resp) => {
                    tracing::info!(
                        device_id = %reading.device_id,
                        temperature = reading.temperature,
                        gas_level = reading.gas_level,
                        status = resp.status().as_u16(),
                        "Reading sent"
                    );
                }
                Err(e) => {
                    tracing::warn!(device_id = %device_id, error = %e, "Send failed");
                }
            }
        }

        round += 1;
        if config.rounds > 0 && round >= config.rounds {
            break;
        }
        sleep(Duration::from_millis(config.interval_ms)).await;
    }

    tracing::info!(rounds = round, "plantmon-simulator finished");
    Ok(())
}
