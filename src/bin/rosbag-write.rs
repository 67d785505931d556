// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbag-write
//!
//! Minimal command-line demo for the bag writer.
//!
//! ```sh
//! # Write a single Int8 message to a new bag
//! rosbag-write --topic /foo --msgtype std_msgs/msg/Int8 --payload 2a output.bag
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use rosbag_writer::Writer;

/// Write a single message to a new ROS1 bag file.
#[derive(Parser)]
#[command(name = "rosbag-write")]
#[command(about = "Write a single message to a new ROS1 bag file", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Destination bag file. Must not already exist.
    output: PathBuf,

    /// Topic to publish on.
    #[arg(long, default_value = "/chatter")]
    topic: String,

    /// Message type. Must be a predefined schema unless --msgdef/--md5sum are given.
    #[arg(long, default_value = "std_msgs/msg/Int8")]
    msgtype: String,

    /// Message payload, as hex bytes (e.g. "2a2b2c").
    #[arg(long, default_value = "2a")]
    payload: String,

    /// Timestamp in nanoseconds since the Unix epoch.
    #[arg(long, default_value_t = 0)]
    timestamp_ns: u64,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let payload = hex_decode(&cli.payload).context("--payload must be valid hex")?;

    let mut writer = Writer::new(&cli.output);
    writer.open().context("opening bag file")?;
    let handle = writer
        .add_connection(&cli.topic, &cli.msgtype, None, None, None, None)
        .context("adding connection")?;
    writer
        .write(handle, cli.timestamp_ns, &payload)
        .context("writing message")?;
    writer.close().context("closing bag file")?;

    tracing::info!(path = %cli.output.display(), "bag written");
    Ok(())
}

fn hex_decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        anyhow::bail!("hex string must have an even number of digits");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(Into::into))
        .collect()
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
