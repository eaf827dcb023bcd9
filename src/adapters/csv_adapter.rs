//! CSV file price data adapter.
//!
//! One file holds every instrument, one row per symbol and day:
//!
//! ```text
//! Symbol,Date,Open,High,Low,Close,Volume
//! TECH_A,2024-01-01,100.00,101.50,99.20,100.80,120345
//! ```

use crate::domain::error::StratbenchError;
use crate::domain::ohlcv::PricePoint;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 7] = ["Symbol", "Date", "Open", "High", "Low", "Close", "Volume"];

pub struct CsvPriceAdapter {
    order: Vec<String>,
    prices: HashMap<String, Vec<PricePoint>>,
}

impl CsvPriceAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratbenchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StratbenchError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let adapter = Self::from_string(&content)?;
        info!(
            "Loaded {} symbols from {}",
            adapter.order.len(),
            path.display()
        );
        Ok(adapter)
    }

    pub fn from_string(content: &str) -> Result<Self, StratbenchError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut order = Vec::new();
        let mut prices: HashMap<String, Vec<PricePoint>> = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StratbenchError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let symbol = field(&record, 0, "symbol", line)?.to_uppercase();
            if symbol.is_empty() {
                return Err(malformed(line, "empty symbol"));
            }
            let date_str = field(&record, 1, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| malformed(line, &format!("invalid date {:?}: {}", date_str, e)))?;

            let point = PricePoint {
                date,
                open: number(&record, 2, "open", line)?,
                high: number(&record, 3, "high", line)?,
                low: number(&record, 4, "low", line)?,
                close: number(&record, 5, "close", line)?,
                volume: field(&record, 6, "volume", line)?
                    .parse()
                    .map_err(|e| malformed(line, &format!("invalid volume value: {}", e)))?,
            };

            prices
                .entry(symbol.clone())
                .or_insert_with(|| {
                    order.push(symbol);
                    Vec::new()
                })
                .push(point);
        }

        for symbol in &order {
            if let Some(series) = prices.get_mut(symbol) {
                series.sort_by_key(|p| p.date);
                if let Some(w) = series.windows(2).find(|w| w[0].date == w[1].date) {
                    return Err(StratbenchError::Data {
                        reason: format!("duplicate date {} for {}", w[0].date, symbol),
                    });
                }
            }
        }

        Ok(Self { order, prices })
    }
}

fn malformed(line: u64, reason: &str) -> StratbenchError {
    StratbenchError::Data {
        reason: format!("line {}: {}", line, reason),
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, StratbenchError> {
    record
        .get(index)
        .ok_or_else(|| malformed(line, &format!("missing {} column", name)))
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<f64, StratbenchError> {
    let raw = field(record, index, name, line)?;
    let value: f64 = raw
        .parse()
        .map_err(|e| malformed(line, &format!("invalid {} value: {}", name, e)))?;
    if !value.is_finite() {
        return Err(malformed(line, &format!("non-finite {} value", name)));
    }
    Ok(value)
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StratbenchError> {
        Ok(self.prices.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError> {
        Ok(self.order.clone())
    }
}

/// Write `series` in the single-file layout read by [`CsvPriceAdapter`].
pub fn write_prices<W: Write>(
    writer: W,
    series: &[(String, Vec<PricePoint>)],
) -> Result<(), StratbenchError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let to_data = |e: csv::Error| StratbenchError::Data {
        reason: format!("CSV write error: {}", e),
    };

    wtr.write_record(HEADER).map_err(to_data)?;
    for (symbol, prices) in series {
        for p in prices {
            wtr.write_record([
                symbol.clone(),
                p.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", p.open),
                format!("{:.2}", p.high),
                format!("{:.2}", p.low),
                format!("{:.2}", p.close),
                p.volume.to_string(),
            ])
            .map_err(to_data)?;
        }
    }
    wtr.flush()?;
    Ok(())
}
