//! Compile-time symbol reconciliation
//!
//! The stored symbol set of a platform group is rewritten by removing every
//! symbol the configuration manages and adding the symbols wanted for this
//! invocation. Symbols the configuration does not know about are left alone.

use crate::error::BuildResult;
use crate::host::SymbolStore;
use shipwright_config::SymbolGroup;
use std::collections::BTreeSet;
use tracing::info;

/// Separator used by the symbol store
pub const SYMBOL_SEPARATOR: char = ';';

/// Parse a `;`-delimited symbol string; blanks are dropped
pub fn parse_symbols(raw: &str) -> BTreeSet<String> {
    raw.split(SYMBOL_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join symbols into the canonical sorted, de-duplicated form
pub fn join_symbols<I, S>(symbols: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: BTreeSet<String> = symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    set.into_iter().collect::<Vec<_>>().join(";")
}

/// `(current - managed) + desired`
pub fn reconcile<C, M, D>(current: C, managed: M, desired: D) -> BTreeSet<String>
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    M: IntoIterator,
    M::Item: AsRef<str>,
    D: IntoIterator,
    D::Item: AsRef<str>,
{
    let mut result: BTreeSet<String> = current
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    for symbol in managed {
        result.remove(symbol.as_ref().trim());
    }

    for symbol in desired {
        let symbol = symbol.as_ref().trim();
        if !symbol.is_empty() {
            result.insert(symbol.to_string());
        }
    }

    result
}

/// Reconcile the stored symbols of `group` and write the result back
///
/// A platform without a symbol group has nothing to read or write; the
/// result is then just the desired set.
pub fn apply_managed_symbols<M, D>(
    store: &dyn SymbolStore,
    group: Option<SymbolGroup>,
    managed: M,
    desired: D,
) -> BuildResult<BTreeSet<String>>
where
    M: IntoIterator,
    M::Item: AsRef<str>,
    D: IntoIterator,
    D::Item: AsRef<str>,
{
    let Some(group) = group else {
        return Ok(reconcile(Vec::<String>::new(), managed, desired));
    };

    let current = parse_symbols(&store.symbols_raw(group));
    let applied = reconcile(&current, managed, desired);
    store.set_symbols(group, &applied)?;

    info!(
        group = group.name(),
        symbols = %join_symbols(&applied),
        "applied symbols"
    );
    Ok(applied)
}
