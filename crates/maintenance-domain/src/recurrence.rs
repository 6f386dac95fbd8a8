// recurrence.rs
use crate::DomainError;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unidad de recurrencia de un plan de mantenimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceUnit {
  Day,
  Week,
  Month,
  Year,
}

impl RecurrenceUnit {
  pub fn as_str(&self) -> &'static str {
    match self {
      RecurrenceUnit::Day => "day",
      RecurrenceUnit::Week => "week",
      RecurrenceUnit::Month => "month",
      RecurrenceUnit::Year => "year",
    }
  }
}

impl FromStr for RecurrenceUnit {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "day" => Ok(RecurrenceUnit::Day),
      "week" => Ok(RecurrenceUnit::Week),
      "month" => Ok(RecurrenceUnit::Month),
      "year" => Ok(RecurrenceUnit::Year),
      _ => Err(DomainError::InvalidUnit(s.to_string())),
    }
  }
}

impl fmt::Display for RecurrenceUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Desplazamiento de calendario. Meses y años son conceptos propios y no
/// equivalen a un número fijo de días.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarOffset {
  Days(u32),
  Weeks(u32),
  Months(u32),
  Years(u32),
}

impl CalendarOffset {
  /// Suma el desplazamiento a `date`. Si el día no existe en el mes destino
  /// se usa el último día de ese mes (31 de enero + 1 mes = 28/29 de febrero).
  pub fn add_to(&self, date: NaiveDate) -> Result<NaiveDate, DomainError> {
    let out = match *self {
      CalendarOffset::Days(n) => date.checked_add_days(Days::new(u64::from(n))),
      CalendarOffset::Weeks(n) => date.checked_add_days(Days::new(u64::from(n) * 7)),
      CalendarOffset::Months(n) => date.checked_add_months(Months::new(n)),
      CalendarOffset::Years(n) => n.checked_mul(12).and_then(|m| date.checked_add_months(Months::new(m))),
    };
    out.ok_or_else(|| DomainError::DateOutOfRange(format!("{} + {:?}", date, self)))
  }

  /// Inverso de `add_to`.
  pub fn sub_from(&self, date: NaiveDate) -> Result<NaiveDate, DomainError> {
    let out = match *self {
      CalendarOffset::Days(n) => date.checked_sub_days(Days::new(u64::from(n))),
      CalendarOffset::Weeks(n) => date.checked_sub_days(Days::new(u64::from(n) * 7)),
      CalendarOffset::Months(n) => date.checked_sub_months(Months::new(n)),
      CalendarOffset::Years(n) => n.checked_mul(12).and_then(|m| date.checked_sub_months(Months::new(m))),
    };
    out.ok_or_else(|| DomainError::DateOutOfRange(format!("{} - {:?}", date, self)))
  }
}

/// Convierte `(quantity, unit)` en un `CalendarOffset`.
///
/// Falla con `InvalidQuantity` si `quantity <= 0` o no cabe en un `u32`.
pub fn offset(quantity: i64, unit: RecurrenceUnit) -> Result<CalendarOffset, DomainError> {
  if quantity <= 0 {
    return Err(DomainError::InvalidQuantity(quantity));
  }
  let n = u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity(quantity))?;
  Ok(match unit {
    RecurrenceUnit::Day => CalendarOffset::Days(n),
    RecurrenceUnit::Week => CalendarOffset::Weeks(n),
    RecurrenceUnit::Month => CalendarOffset::Months(n),
    RecurrenceUnit::Year => CalendarOffset::Years(n),
  })
}

/// Igual que `offset` pero parte de la etiqueta textual de la unidad, tal
/// como llega desde almacenamiento o configuración.
pub fn offset_from_tag(quantity: i64, unit: &str) -> Result<CalendarOffset, DomainError> {
  offset(quantity, unit.parse()?)
}

/// Intervalo de recurrencia ya validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceInterval {
  quantity: u32,
  unit: RecurrenceUnit,
  step: CalendarOffset,
}

impl RecurrenceInterval {
  pub fn new(quantity: i64, unit: RecurrenceUnit) -> Result<Self, DomainError> {
    let step = offset(quantity, unit)?;
    // `offset` ya garantiza que la cantidad cabe en u32
    let quantity = u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity(quantity))?;
    Ok(Self { quantity, unit, step })
  }

  pub fn quantity(&self) -> u32 {
    self.quantity
  }

  pub fn unit(&self) -> RecurrenceUnit {
    self.unit
  }

  pub fn offset(&self) -> CalendarOffset {
    self.step
  }

  /// Siguiente ocurrencia tras `date`.
  pub fn step(&self, date: NaiveDate) -> Result<NaiveDate, DomainError> {
    self.step.add_to(date)
  }
}

impl fmt::Display for RecurrenceInterval {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "cada {} {}", self.quantity, self.unit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn maps_each_unit_to_its_offset() {
    assert_eq!(offset(1, RecurrenceUnit::Day).unwrap(), CalendarOffset::Days(1));
    assert_eq!(offset(1, RecurrenceUnit::Week).unwrap(), CalendarOffset::Weeks(1));
    assert_eq!(offset(1, RecurrenceUnit::Month).unwrap(), CalendarOffset::Months(1));
    assert_eq!(offset(1, RecurrenceUnit::Year).unwrap(), CalendarOffset::Years(1));
  }

  #[test]
  fn rejects_non_positive_quantity() {
    assert_eq!(offset(0, RecurrenceUnit::Month), Err(DomainError::InvalidQuantity(0)));
    assert_eq!(offset(-3, RecurrenceUnit::Day), Err(DomainError::InvalidQuantity(-3)));
  }

  #[test]
  fn rejects_unknown_unit_tag() {
    match offset_from_tag(1, "fortnight") {
      Err(DomainError::InvalidUnit(tag)) => assert_eq!(tag, "fortnight"),
      other => panic!("expected InvalidUnit, got {:?}", other),
    }
    assert_eq!(offset_from_tag(2, "Week").unwrap(), CalendarOffset::Weeks(2));
  }

  #[test]
  fn month_end_is_clamped_not_skipped() {
    let jan31 = d("2023-01-31");
    assert_eq!(CalendarOffset::Months(1).add_to(jan31).unwrap(), d("2023-02-28"));
    assert_eq!(CalendarOffset::Months(1).add_to(d("2024-01-31")).unwrap(), d("2024-02-29"));
    assert_eq!(CalendarOffset::Years(1).add_to(d("2024-02-29")).unwrap(), d("2025-02-28"));
  }

  #[test]
  fn weeks_are_seven_days() {
    assert_eq!(CalendarOffset::Weeks(2).add_to(d("2023-01-25")).unwrap(), d("2023-02-08"));
  }

  #[test]
  fn add_then_sub_returns_original_date() {
    let units = [RecurrenceUnit::Day, RecurrenceUnit::Week, RecurrenceUnit::Month, RecurrenceUnit::Year];
    // días 1..=28 existen en todos los meses
    let dates = [d("2023-01-25"), d("2020-02-28"), d("1999-12-01"), d("2023-07-14")];
    for unit in units {
      for q in [1_i64, 2, 5, 13] {
        let off = offset(q, unit).unwrap();
        for date in dates {
          let there = off.add_to(date).unwrap();
          assert!(there > date);
          assert_eq!(off.sub_from(there).unwrap(), date, "{:?} {}", off, date);
        }
      }
    }
  }

  #[test]
  fn interval_steps_monthly() {
    let interval = RecurrenceInterval::new(1, RecurrenceUnit::Month).unwrap();
    assert_eq!(interval.step(d("2023-01-25")).unwrap(), d("2023-02-25"));
    assert_eq!(interval.to_string(), "cada 1 month");
  }
}
