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

//! # HLX Proxy Daemon
//!
//! `hlxproxyd` terminates many client connections on one side and holds
//! a single session to the real hardware on the other. Mutations are
//! forwarded upstream and their responses relayed back; queries are
//! answered from the refreshed local mirror; state-change notifications
//! - whether caused by a client or originated by the hardware - fan out
//! to every subscriber.
//!
//! `hlxsimd` shares the same process skeleton and serves the emulated
//! hardware instead.

pub mod options;
pub mod proxy;

pub use self::options::CommonOptions;
pub use self::proxy::Proxy;
