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

//! The HLX proxy daemon.

use clap::Parser;
use hlx_proxyd::options::{CommonOptions, wait_for_stop_signal};
use hlx_proxyd::proxy::Proxy;
use std::time::Duration;
use tracing::{error, info};

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(
    name = "hlxproxyd",
    version,
    about = "Proxy daemon for the HLX audio matrix"
)]
struct Options {
    #[command(flatten)]
    common: CommonOptions,

    /// URL or host[:port] of the upstream HLX hardware.
    target: String,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let options = Options::parse();
    options.common.init_logging();

    let versions = options.common.ip_versions();

    let mut proxy = match Proxy::new(&options.target, versions, TIMEOUT).await {
        Ok(proxy) => proxy,
        Err(err) => {
            error!(upstream = %options.target, %err, "failed to reach the upstream hardware");
            return 1;
        }
    };

    if let Err(err) = proxy.listen(None, versions).await {
        error!(%err, "failed to start listening");
        return 1;
    }

    info!("hlxproxyd started");

    tokio::select! {
        _ = proxy.run() => {}
        _ = wait_for_stop_signal() => {}
    }

    proxy.shutdown().await;
    info!("hlxproxyd stopped");

    0
}
