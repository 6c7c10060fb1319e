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

use std::path::PathBuf;

/// Errors raised while rotating a log file to an archive path.
///
/// Rotation failures never propagate to logging callers; destinations catch
/// them, report through the internal diagnostic path, and keep the original
/// file open.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("archive file already exists: {}", .0.display())]
    ArchiveExists(PathBuf),
    #[error("log file does not exist: {}", .0.display())]
    MissingLogFile(PathBuf),
    #[error("failed to perform IO action: {0}")]
    Io(#[from] std::io::Error),
}
