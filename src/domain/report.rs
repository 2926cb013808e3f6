//! Message and watchlist formatting for notifications.

use crate::domain::improvement::ImprovedSymbol;
use crate::domain::symbol_strength::SymbolStrength;
use crate::domain::universe::UniverseChange;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;

const QUOTE_SUFFIX: &str = "USDT";

/// Symbol as shown in chat messages: quote suffix stripped.
pub fn display_symbol(symbol: &str) -> String {
    symbol.replace(QUOTE_SUFFIX, "")
}

fn display_list<'a>(symbols: impl Iterator<Item = &'a str>) -> String {
    symbols.map(display_symbol).collect::<Vec<_>>().join(", ")
}

/// Caption for the ranking message: the top list, then improvers if any.
pub fn ranking_caption(top: &[SymbolStrength], improvers: Option<&[ImprovedSymbol]>) -> String {
    let mut caption = format!(
        "RS Rank Top {}:\n{}",
        top.len(),
        display_list(top.iter().map(|s| s.symbol.as_str()))
    );
    if let Some(improvers) = improvers.filter(|i| !i.is_empty()) {
        caption.push_str("\n\nFive-day improvers:\n");
        caption.push_str(&display_list(improvers.iter().map(|i| i.current.symbol.as_str())));
    }
    caption
}

/// TradingView watchlist import: one `###SECTION,symbols...` line per list.
pub fn watchlist_content(
    source: &dyn PriceSource,
    top: &[SymbolStrength],
    improvers: Option<&[ImprovedSymbol]>,
) -> String {
    let top_symbols: Vec<String> = top.iter().map(|s| s.symbol.clone()).collect();
    let mut content = format!(
        "###RS_TOP_{},{}\n",
        top.len(),
        source.watchlist_symbols(&top_symbols)
    );
    if let Some(improvers) = improvers.filter(|i| !i.is_empty()) {
        let symbols: Vec<String> = improvers.iter().map(|i| i.current.symbol.clone()).collect();
        content.push_str(&format!(
            "###FIVE_DAY_IMPROVERS,{}\n",
            source.watchlist_symbols(&symbols)
        ));
    }
    content
}

pub fn watchlist_file_name(date: NaiveDate) -> String {
    format!("0.RS_{}.txt", date.format("%Y%m%d"))
}

pub fn universe_message(change: &UniverseChange) -> String {
    match change {
        UniverseChange::Established { .. } => "Symbol list re-established.\n".to_string(),
        UniverseChange::Changed { added, removed, .. } => {
            let mut message = String::new();
            if !added.is_empty() {
                message.push_str("Added pairs:\n");
                message.push_str(&added.join(", "));
                message.push('\n');
            }
            if !removed.is_empty() {
                message.push_str("Removed pairs:\n");
                message.push_str(&removed.join(", "));
                message.push('\n');
            }
            message
        }
    }
}
