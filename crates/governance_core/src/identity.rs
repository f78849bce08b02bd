use std::collections::HashMap;

use crate::config::AddressConfig;

/// Maps an account address to a human-readable alias, if one exists.
pub trait NameResolver {
    fn resolve(&self, address: &str) -> Option<String>;
}

/// Resolver that never finds an alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl NameResolver for NoAliases {
    fn resolve(&self, _address: &str) -> Option<String> {
        None
    }
}

impl NameResolver for HashMap<String, String> {
    fn resolve(&self, address: &str) -> Option<String> {
        self.get(address).cloned()
    }
}

/// `0x1234567890abcdef` -> `0x1234...cdef`. Addresses too short to gain
/// anything from shortening are returned unchanged.
pub fn shorten_address(address: &str, config: &AddressConfig) -> String {
    let chars: Vec<char> = address.chars().collect();
    let shortened_len = config
        .prefix_len
        .saturating_add(config.suffix_len)
        .saturating_add(3);
    if chars.len() <= shortened_len {
        return address.to_string();
    }
    let prefix: String = chars[..config.prefix_len].iter().collect();
    let suffix: String = chars[chars.len() - config.suffix_len..].iter().collect();
    format!("{prefix}...{suffix}")
}

pub fn display_name(resolver: &dyn NameResolver, address: &str, config: &AddressConfig) -> String {
    match resolver.resolve(address) {
        Some(alias) if !alias.trim().is_empty() => alias,
        _ => shorten_address(address, config),
    }
}
