use std::fmt;
use std::str::FromStr;

use crate::config::PAGE_SIZE;

/// Columns the flight listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Year,
    Month,
    FlightNumber,
    Origin,
    OriginName,
    OriginCity,
    OriginCountry,
    Destination,
    DestName,
    DestCity,
    DestCountry,
    Airline,
    AircraftId,
    AircraftName,
    PassengerCount,
    AverageAge,
    Distance,
}

impl SortColumn {
    pub const ALL: &'static [SortColumn] = &[
        SortColumn::Year,
        SortColumn::Month,
        SortColumn::FlightNumber,
        SortColumn::Origin,
        SortColumn::OriginName,
        SortColumn::OriginCity,
        SortColumn::OriginCountry,
        SortColumn::Destination,
        SortColumn::DestName,
        SortColumn::DestCity,
        SortColumn::DestCountry,
        SortColumn::Airline,
        SortColumn::AircraftId,
        SortColumn::AircraftName,
        SortColumn::PassengerCount,
        SortColumn::AverageAge,
        SortColumn::Distance,
    ];

    /// Result column alias in the flight query
    pub fn alias(&self) -> &'static str {
        match self {
            SortColumn::Year => "year",
            SortColumn::Month => "month",
            SortColumn::FlightNumber => "flightNumber",
            SortColumn::Origin => "originIATA",
            SortColumn::OriginName => "originName",
            SortColumn::OriginCity => "originCity",
            SortColumn::OriginCountry => "originCountry",
            SortColumn::Destination => "destinationIATA",
            SortColumn::DestName => "destName",
            SortColumn::DestCity => "destCity",
            SortColumn::DestCountry => "destCountry",
            SortColumn::Airline => "airline",
            SortColumn::AircraftId => "aircraftID",
            SortColumn::AircraftName => "aircraftName",
            SortColumn::PassengerCount => "passengerCount",
            SortColumn::AverageAge => "averageAge",
            SortColumn::Distance => "distance",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .iter()
            .find(|c| c.alias().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = SortColumn::ALL.iter().map(|c| c.alias()).collect();
                format!("unknown column {:?}, expected one of: {}", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 1-based page request; out of range pages are clamped, not rejected
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageRequest {
    pub page: i64,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl PageRequest {
    pub fn new(page: i64, sort: SortColumn, direction: SortDirection) -> Self {
        Self {
            page,
            sort,
            direction,
        }
    }
}

/// Page arithmetic for a fixed page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub total_rows: u64,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(total_rows: u64) -> Self {
        Self::with_page_size(total_rows, PAGE_SIZE)
    }

    pub fn with_page_size(total_rows: u64, page_size: usize) -> Self {
        Self {
            total_rows,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_rows.div_ceil(self.page_size as u64)
    }

    /// Clamp into `[1, total_pages]`; an empty result still has page 1
    pub fn clamp(&self, page: i64) -> u64 {
        let last = self.total_pages().max(1);
        page.clamp(1, last.min(i64::MAX as u64) as i64) as u64
    }

    /// Row offset of an already clamped page
    pub fn offset(&self, page: u64) -> u64 {
        (page.saturating_sub(1)) * self.page_size as u64
    }

    /// Rows on a given page
    pub fn rows_on(&self, page: u64) -> u64 {
        let start = self.offset(page).min(self.total_rows);
        (self.total_rows - start).min(self.page_size as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(Pagination::new(0).total_pages(), 0);
        assert_eq!(Pagination::new(15).total_pages(), 1);
        assert_eq!(Pagination::new(16).total_pages(), 2);
        assert_eq!(Pagination::new(45).total_pages(), 3);
    }

    #[test]
    fn test_clamp() {
        let pages = Pagination::new(40);
        assert_eq!(pages.clamp(0), 1);
        assert_eq!(pages.clamp(-3), 1);
        assert_eq!(pages.clamp(2), 2);
        assert_eq!(pages.clamp(4), 3);
        assert_eq!(pages.clamp(i64::MAX), 3);
        assert_eq!(Pagination::new(0).clamp(5), 1);
    }

    #[test]
    fn test_rows_per_page() {
        let pages = Pagination::new(40);
        assert_eq!(pages.offset(1), 0);
        assert_eq!(pages.offset(3), 30);
        assert_eq!(pages.rows_on(1), 15);
        assert_eq!(pages.rows_on(2), 15);
        assert_eq!(pages.rows_on(3), 10);
    }

    #[test]
    fn test_sort_column_names() {
        assert_eq!("distance".parse::<SortColumn>().unwrap(), SortColumn::Distance);
        assert_eq!("PASSENGERCOUNT".parse::<SortColumn>().unwrap(), SortColumn::PassengerCount);
        assert!("year; DROP TABLE flights".parse::<SortColumn>().is_err());
        for column in SortColumn::ALL {
            assert_eq!(column.alias().parse::<SortColumn>().unwrap(), *column);
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(SortDirection::default().sql(), "ASC");
        assert_eq!(SortDirection::Desc.sql(), "DESC");
    }
}
