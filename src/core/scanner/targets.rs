// src/core/scanner/targets.rs

use crate::core::models::Target;

/// Turns a host list and a port list into targets, host-major then port-minor.
///
/// Nothing is materialized up front: targets are rendered as the iterator is
/// consumed. Hosts are passed through as-is, so a malformed host only fails
/// once a probe tries to reach it.
#[derive(Debug, Clone, Copy)]
pub struct TargetExpander<'a> {
    hosts: &'a [String],
    ports: &'a [u16],
}

impl<'a> TargetExpander<'a> {
    pub fn new(hosts: &'a [String], ports: &'a [u16]) -> Self {
        Self { hosts, ports }
    }

    /// Number of targets the expansion will yield.
    pub fn total(&self) -> usize {
        self.hosts.len() * self.ports.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Target> + use<'a> {
        let ports = self.ports;
        self.hosts
            .iter()
            .flat_map(move |host| ports.iter().map(move |&port| Target::new(host, port)))
    }
}

impl<'a> IntoIterator for TargetExpander<'a> {
    type Item = Target;
    type IntoIter = Box<dyn Iterator<Item = Target> + Send + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
