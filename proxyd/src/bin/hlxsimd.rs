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

//! The HLX hardware simulator: serves the emulated device so clients
//! and the proxy can be exercised without physical hardware.

use clap::Parser;
use hlx_controller::Server;
use hlx_proxyd::options::{CommonOptions, wait_for_stop_signal};
use std::time::Duration;
use tracing::{error, info};

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(
    name = "hlxsimd",
    version,
    about = "Hardware simulator for the HLX audio matrix"
)]
struct Options {
    #[command(flatten)]
    common: CommonOptions,

    /// URL or host[:port] to listen on; the wildcard Telnet port when
    /// omitted.
    target: Option<String>,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let options = Options::parse();
    options.common.init_logging();

    let versions = options.common.ip_versions();

    let mut server = match Server::new(TIMEOUT) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, "failed to initialize the simulator");
            return 1;
        }
    };

    match server.listen(options.target.as_deref(), versions).await {
        Ok(bound) => {
            for address in bound {
                info!(%address, "hlxsimd listening");
            }
        }
        Err(err) => {
            error!(%err, "failed to start listening");
            return 1;
        }
    }

    tokio::select! {
        _ = server.run() => {}
        _ = wait_for_stop_signal() => {}
    }

    server.shutdown().await;
    info!("hlxsimd stopped");

    0
}
