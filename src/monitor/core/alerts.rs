/// Absolute move between two observations, if it reaches `threshold`.
pub fn exceeds_threshold(previous: f64, current: f64, threshold: f64) -> Option<f64> {
    let difference = (current - previous).abs();
    if difference >= threshold {
        Some(difference)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

impl Alert {
    pub fn price_move(symbol: &str, previous: f64, current: f64, threshold: f64) -> Self {
        let difference = (current - previous).abs();
        let subject = format!("{} Price Changed by ${}+", symbol, threshold);
        let body = format!(
            "Previous price: ${:.2}\nCurrent price:  ${:.2}\nDifference is ${:.2}, which is >= ${}.\n",
            previous, current, difference, threshold
        );
        Self { subject, body }
    }
}
