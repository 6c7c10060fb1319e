// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Optional name-based registry for loggers.
//!
//! There is no process-wide default logger. When independent subsystems must
//! locate a shared instance by name, the owning component registers it here
//! and the others look it up; everything else should pass handles explicitly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;

use crate::logger::Logger;

fn registry() -> &'static Mutex<HashMap<String, Logger>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Logger>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register `logger` under its identifier.
///
/// Returns `false` without replacing anything if the name is already taken.
pub fn register(logger: &Logger) -> bool {
    let mut map = registry().lock().unwrap_or_else(PoisonError::into_inner);
    if map.contains_key(logger.identifier()) {
        return false;
    }
    map.insert(logger.identifier().to_string(), logger.clone());
    true
}

/// Look up a registered logger by identifier.
pub fn registered(identifier: &str) -> Option<Logger> {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(identifier)
        .cloned()
}

/// Remove and return the logger registered under `identifier`.
pub fn unregister(identifier: &str) -> Option<Logger> {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_lookup_unregister() {
        let logger = Logger::new("registry-test-logger");
        assert!(register(&logger));
        assert!(!register(&Logger::new("registry-test-logger")));

        let found = registered("registry-test-logger").expect("registered");
        assert_eq!(found.identifier(), "registry-test-logger");

        assert!(unregister("registry-test-logger").is_some());
        assert!(registered("registry-test-logger").is_none());
    }
}
