/*!
Logstash node statistics fixtures

Documents shaped like the answer of `GET /_node/stats/` on a Logstash 5.x node,
plus a builder to add, replace or remove sections for edge-case tests.
*/

use serde_json::{json, Map, Value};

/// Canned `/_node/stats/` documents
pub struct StatsFixture;

impl StatsFixture {
    /// Full node stats answer, trimmed to the sections a probe cares about
    pub fn node_stats() -> Value {
        json!({
            "host": "logstash-01",
            "version": "5.6.16",
            "http_address": "127.0.0.1:9600",
            "id": "9b8c6c2e-0f4b-4f35-9d3f-6c1f0f3b2a41",
            "name": "logstash-01",
            "jvm": {
                "threads": {
                    "count": 39,
                    "peak_count": 41
                },
                "mem": {
                    "heap_used_in_bytes": 310_128_456u64,
                    "heap_used_percent": 15,
                    "heap_committed_in_bytes": 1_037_959_168u64,
                    "heap_max_in_bytes": 2_077_753_344u64,
                    "non_heap_used_in_bytes": 164_396_976u64,
                    "non_heap_committed_in_bytes": 176_062_464u64,
                    "pools": {
                        "survivor": {
                            "peak_used_in_bytes": 8_912_896u64,
                            "used_in_bytes": 1_281_072u64,
                            "peak_max_in_bytes": 34_865_152u64,
                            "max_in_bytes": 69_730_304u64,
                            "committed_in_bytes": 17_432_576u64
                        },
                        "old": {
                            "peak_used_in_bytes": 266_843_000u64,
                            "used_in_bytes": 266_843_000u64,
                            "peak_max_in_bytes": 724_828_160u64,
                            "max_in_bytes": 1_449_656_320u64,
                            "committed_in_bytes": 880_803_840u64
                        },
                        "young": {
                            "peak_used_in_bytes": 71_630_848u64,
                            "used_in_bytes": 42_004_384u64,
                            "peak_max_in_bytes": 279_183_360u64,
                            "max_in_bytes": 558_366_720u64,
                            "committed_in_bytes": 139_722_752u64
                        }
                    }
                },
                "gc": {
                    "collectors": {
                        "old": {
                            "collection_time_in_millis": 1_267,
                            "collection_count": 12
                        },
                        "young": {
                            "collection_time_in_millis": 30_412,
                            "collection_count": 1_873
                        }
                    }
                },
                "uptime_in_millis": 86_402_315u64
            },
            "process": {
                "open_file_descriptors": 102,
                "peak_open_file_descriptors": 110,
                "max_file_descriptors": 16_384,
                "mem": {
                    "total_virtual_in_bytes": 5_283_061_760u64
                },
                "cpu": {
                    "total_in_millis": 4_512_730u64,
                    "percent": 3,
                    "load_average": {
                        "1m": 0.61,
                        "5m": 0.52,
                        "15m": 0.47
                    }
                }
            },
            "pipeline": {
                "events": {
                    "duration_in_millis": 29_184_012u64,
                    "in": 1_210_443u64,
                    "filtered": 1_210_440u64,
                    "out": 1_210_431u64,
                    "queue_push_duration_in_millis": 81_221
                },
                "plugins": {
                    "inputs": [],
                    "filters": [],
                    "outputs": []
                },
                "reloads": {
                    "last_error": null,
                    "successes": 0,
                    "last_success_timestamp": null,
                    "last_failure_timestamp": null,
                    "failures": 0
                },
                "queue": {
                    "type": "memory"
                }
            },
            "reloads": {
                "successes": 0,
                "failures": 0
            },
            "os": {}
        })
    }

    /// Smallest document carrying all three sections the probe reads
    pub fn minimal() -> Value {
        json!({
            "jvm": { "uptime_in_millis": 100 },
            "process": { "cpu": { "percent": 5 } },
            "pipeline": { "events": { "in": 10, "filtered": 8 } }
        })
    }

    pub fn builder() -> StatsBuilder {
        StatsBuilder::new(Self::node_stats())
    }
}

/// Reshapes a stats document by dotted path
pub struct StatsBuilder {
    document: Value,
}

impl StatsBuilder {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Sets `path` (e.g. `"pipeline.events.in"`) to `value`, creating
    /// intermediate objects and replacing non-object ones on the way
    pub fn with(mut self, path: &str, value: Value) -> Self {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return self;
        };

        let mut current = &mut self.document;
        for segment in segments {
            current = ensure_object(current)
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(current).insert(leaf.to_string(), value);
        self
    }

    /// Removes `path` if present
    pub fn without(mut self, path: &str) -> Self {
        remove_path(&mut self.document, path);
        self
    }

    pub fn build(self) -> Value {
        self.document
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(obj) => obj,
        _ => unreachable!("replaced by an object above"),
    }
}

fn remove_path(document: &mut Value, path: &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = document;
    for segment in segments {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(obj) = current.as_object_mut() {
        obj.remove(leaf);
    }
}
