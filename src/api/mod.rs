pub mod coingecko;
pub mod sendgrid;
