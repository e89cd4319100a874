//! Excel workbook output for results too large to send as text

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, XlsxError};

use crate::domain::entities::{EntrySet, ResultBundle, UserEntry};

pub const SHEET_PARTICIPANTS: &str = "participants";
pub const SHEET_MENTIONS: &str = "mentions";
pub const SHEET_CHANNELS: &str = "channels";

const EXPORT_DATE: &str = "Export date";
/// Reserved for profile enrichment, always empty for now
const DESCRIPTIVE_HEADERS: [&str; 3] = ["Bio", "Registration date", "Has channel"];

const META_ROW: u32 = 0;
const HEADER_ROW: u32 = 2;
const FIRST_DATA_ROW: u32 = 3;
const MAX_COLUMN_WIDTH: usize = 46;
const MIN_COLUMN_WIDTH: usize = 10;

/// One worksheet's content, independent of cell styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    fn new(name: &'static str, identity_header: &'static str, entries: &EntrySet, exported_at: &str, identity: fn(&UserEntry) -> String) -> Self {
        let mut headers = vec![EXPORT_DATE, identity_header];
        headers.extend(DESCRIPTIVE_HEADERS);

        let rows = entries
            .iter()
            .map(|entry| {
                let mut row = vec![exported_at.to_string(), identity(entry)];
                row.extend(DESCRIPTIVE_HEADERS.iter().map(|_| String::new()));
                row
            })
            .collect();

        Self { name, headers, rows }
    }

    fn column_widths(&self) -> Vec<usize> {
        (0..self.headers.len())
            .map(|col| {
                let header = self.headers[col].chars().count();
                let widest = self.rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .max()
                    .unwrap_or(0);
                (header.max(widest) + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sheet contents for a bundle: participants by display name, mentions and
/// channels by handle
pub fn build_sheets(result: &ResultBundle, exported_at: DateTime<Utc>) -> Vec<SheetData> {
    let stamp = format_timestamp(exported_at);
    vec![
        SheetData::new(SHEET_PARTICIPANTS, "Full name", &result.participants, &stamp, participant_cell),
        SheetData::new(SHEET_MENTIONS, "Username", &result.mentions, &stamp, mention_cell),
        SheetData::new(SHEET_CHANNELS, "Username", &result.channels, &stamp, channel_cell),
    ]
}

/// Render the three-sheet workbook to xlsx bytes
pub fn render_workbook(result: &ResultBundle, exported_at: DateTime<Utc>) -> Result<Vec<u8>, XlsxError> {
    let stamp = format_timestamp(exported_at);
    let header_format = Format::new()
        .set_bold()
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(0xD9D9D9))
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    for sheet in build_sheets(result, exported_at) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        worksheet.write_string(META_ROW, 0, EXPORT_DATE)?;
        worksheet.write_string(META_ROW, 1, stamp.as_str())?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(HEADER_ROW, col as u16, *header, &header_format)?;
        }

        for (offset, row) in sheet.rows.iter().enumerate() {
            let row_num = FIRST_DATA_ROW + offset as u32;
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(row_num, col as u16, value.as_str())?;
                }
            }
        }

        for (col, width) in sheet.column_widths().into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width as f64)?;
        }
        worksheet.set_freeze_panes(FIRST_DATA_ROW, 0)?;
    }

    workbook.save_to_buffer()
}

fn participant_cell(u: &UserEntry) -> String {
    u.display_name().unwrap_or_default().to_string()
}

fn mention_cell(u: &UserEntry) -> String {
    u.username().map(|name| format!("@{}", name)).unwrap_or_default()
}

/// Channels sometimes only have a link
fn channel_cell(u: &UserEntry) -> String {
    u.username()
        .map(|name| format!("@{}", name))
        .or_else(|| u.link().map(str::to_string))
        .unwrap_or_default()
}
