// Licensed under the Apache-2.0 license

mod common;
mod test_certs;
mod test_inject_eps;
mod test_params;
mod test_ping;
mod test_query;
