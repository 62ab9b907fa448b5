/*!
# Probe DevKit - Stubs and utilities for probe development

Library that makes the Logstash probe testable without a live node:
- Realistic `/_node/stats/` fixtures and a builder to reshape them
- A mock Logstash node served over a local HTTP server
- A recording writer capturing what the sender emits
- A test harness bundling the above
*/

pub mod fixtures;
pub mod mock_logstash;
pub mod recording;
pub mod test_utils;

pub use fixtures::{StatsBuilder, StatsFixture};
pub use mock_logstash::{localhost_binding_permitted, refused_port, MockLogstash, STATS_PATH};
pub use recording::{RecordingWriter, SenderLine};
pub use test_utils::TestHarness;
