/// Ranking and selection policy over normalized quotes
use super::types::Quote;
use std::cmp::Ordering;

/// Sort best-first and annotate `is_best` / `savings_over_worst`
///
/// The sort is stable, so equal outputs keep dispatch order. Re-ranking an
/// already ranked vector is a no-op.
pub fn rank_quotes(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| compare_output(b, a));

    let worst = quotes
        .iter()
        .map(|q| q.output_amount_normalized)
        .fold(f64::INFINITY, f64::min);

    for (index, quote) in quotes.iter_mut().enumerate() {
        quote.is_best = index == 0;
        quote.savings_over_worst = quote.output_amount_normalized - worst;
    }

    quotes
}

fn compare_output(a: &Quote, b: &Quote) -> Ordering {
    a.output_amount_normalized.total_cmp(&b.output_amount_normalized)
}

/// USD value of each output and of its savings; `None` price clears both
pub fn apply_usd_pricing(quotes: &mut [Quote], output_price_usd: Option<f64>) {
    let price = output_price_usd.filter(|p| p.is_finite() && *p > 0.0);
    for quote in quotes.iter_mut() {
        quote.output_usd = price.map(|p| quote.output_amount_normalized * p);
        quote.savings_usd = price.map(|p| quote.savings_over_worst * p);
    }
}

/// The quote flagged best, if any
pub fn best_quote(quotes: &[Quote]) -> Option<&Quote> {
    quotes.iter().find(|q| q.is_best)
}
