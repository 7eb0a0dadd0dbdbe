//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! The flag surface and process plumbing shared by both binaries.

use clap::Args;
use hlx_service::IpVersions;
use tracing::level_filters::LevelFilter;

/// Flags common to `hlxproxyd` and `hlxsimd`.
#[derive(Debug, Args)]
pub struct CommonOptions {
    /// Enable diagnostic output, optionally at LEVEL.
    #[arg(
        short = 'd',
        long = "debug",
        value_name = "LEVEL",
        num_args = 0..=1,
        default_missing_value = "1"
    )]
    pub debug: Option<u8>,

    /// Use IPv4 addresses only.
    #[arg(short = '4', long = "ipv4-only", conflicts_with = "ipv6_only")]
    pub ipv4_only: bool,

    /// Use IPv6 addresses only.
    #[arg(short = '6', long = "ipv6-only")]
    pub ipv6_only: bool,

    /// Run silently, suppressing all diagnostic and informative output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Write all output to the system log rather than standard error.
    #[arg(short = 's', long = "syslog")]
    pub syslog: bool,

    /// Enable verbose output, optionally at LEVEL.
    #[arg(
        short = 'v',
        long = "verbose",
        value_name = "LEVEL",
        num_args = 0..=1,
        default_missing_value = "1"
    )]
    pub verbose: Option<u8>,
}

impl CommonOptions {
    /// The IP version set the flags select.
    pub fn ip_versions(&self) -> IpVersions {
        if self.ipv4_only {
            IpVersions::v4_only()
        } else if self.ipv6_only {
            IpVersions::v6_only()
        } else {
            IpVersions::both()
        }
    }

    /// The log level the flags select. Quiet wins; debug outranks
    /// verbose.
    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match (self.debug, self.verbose) {
            (Some(level), _) if level >= 2 => LevelFilter::TRACE,
            (Some(_), _) => LevelFilter::DEBUG,
            (None, Some(level)) if level >= 2 => LevelFilter::DEBUG,
            (None, Some(_)) => LevelFilter::INFO,
            (None, None) => LevelFilter::WARN,
        }
    }

    /// Installs the tracing subscriber. The syslog flag selects a plain
    /// single-line format suitable for log collectors.
    pub fn init_logging(&self) {
        let builder = tracing_subscriber::fmt()
            .with_max_level(self.level_filter())
            .with_writer(std::io::stderr);

        if self.syslog {
            builder.with_ansi(false).without_time().init();
        } else {
            builder.init();
        }
    }
}

/// Waits for any of SIGHUP, SIGINT, SIGQUIT or SIGTERM.
pub async fn wait_for_stop_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).expect("install SIGHUP handler");
    let mut interrupt = signal(SignalKind::interrupt()).expect("install SIGINT handler");
    let mut quit = signal(SignalKind::quit()).expect("install SIGQUIT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("install SIGTERM handler");

    tokio::select! {
        _ = hangup.recv() => tracing::info!("caught SIGHUP"),
        _ = interrupt.recv() => tracing::info!("caught SIGINT"),
        _ = quit.recv() => tracing::info!("caught SIGQUIT"),
        _ = terminate.recv() => tracing::info!("caught SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> CommonOptions {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            common: CommonOptions,
        }

        Harness::try_parse_from(std::iter::once(&"test").chain(args))
            .unwrap()
            .common
    }

    #[test]
    fn test_ip_version_flags() {
        assert_eq!(options(&[]).ip_versions(), IpVersions::both());
        assert_eq!(options(&["-4"]).ip_versions(), IpVersions::v4_only());
        assert_eq!(options(&["-6"]).ip_versions(), IpVersions::v6_only());
    }

    #[test]
    fn test_ip_version_flags_are_mutually_exclusive() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            common: CommonOptions,
        }

        assert!(Harness::try_parse_from(["test", "-4", "-6"]).is_err());
    }

    #[test]
    fn test_level_selection() {
        assert_eq!(options(&[]).level_filter(), LevelFilter::WARN);
        assert_eq!(options(&["-v"]).level_filter(), LevelFilter::INFO);
        assert_eq!(options(&["--verbose=2"]).level_filter(), LevelFilter::DEBUG);
        assert_eq!(options(&["-d"]).level_filter(), LevelFilter::DEBUG);
        assert_eq!(options(&["--debug=2"]).level_filter(), LevelFilter::TRACE);
        assert_eq!(options(&["-q", "-d"]).level_filter(), LevelFilter::ERROR);
    }
}
