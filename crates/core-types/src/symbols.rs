/// Splits free text such as `"aapl, MSFT,,googl "` into clean ticker symbols.
///
/// Symbols are trimmed and uppercased, empties are dropped, and repeats are
/// removed keeping the first occurrence.
pub fn parse_symbol_list(text: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in text.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
