/// Maps request paths under `virtual_prefix` to storage paths under `backing_prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMount {
    pub virtual_prefix: String,
    pub backing_prefix: String,
}

impl StaticMount {
    pub fn new(virtual_prefix: impl Into<String>, backing_prefix: impl Into<String>) -> Self {
        Self {
            virtual_prefix: virtual_prefix.into(),
            backing_prefix: backing_prefix.into(),
        }
    }

    /// Storage path for `path`, if it starts with this mount's prefix.
    ///
    /// The match is textual, so `/static` also claims `/staticfoo`.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let relative = path.strip_prefix(&self.virtual_prefix)?;
        let relative = relative.strip_prefix('/').unwrap_or(relative);

        let mut full = self.backing_prefix.clone();
        if !full.ends_with('/') && !relative.starts_with('/') {
            full.push('/');
        }
        full.push_str(relative);
        Some(full)
    }
}

/// Mounts in registration order; the first prefix match wins, so more specific
/// prefixes have to be registered before broader ones.
#[derive(Debug, Clone, Default)]
pub struct StaticMounts {
    mounts: Vec<StaticMount>,
}

impl StaticMounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mount: StaticMount) {
        self.mounts.push(mount);
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    pub fn resolve(&self, path: &str) -> Option<String> {
        self.mounts.iter().find_map(|m| m.resolve(path))
    }
}
