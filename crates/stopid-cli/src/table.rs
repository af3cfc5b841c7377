//! Plain-text site table for terminal output.

use std::fmt::Write as _;

use stopid_api::view::SiteView;

const HEADERS: [&str; 5] = ["ID", "NAME", "CATEGORY", "COUNTRY", "SEVERITY"];

/// Render `sites` as left-aligned columns, one row per site, followed by a
/// count line.
pub fn render(sites: &[SiteView]) -> String {
  let rows: Vec<[String; 5]> = sites
    .iter()
    .map(|v| {
      [
        v.site.id.to_string(),
        v.site.name.clone(),
        v.site.category.clone(),
        v.site.country.clone(),
        v.severity_label.to_string(),
      ]
    })
    .collect();

  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_row(&mut out, &HEADERS, &widths);
  for row in &rows {
    push_row(&mut out, row, &widths);
  }
  let _ = writeln!(out, "{} site(s)", rows.len());
  out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
  let line = cells
    .iter()
    .zip(widths)
    .map(|(cell, &width)| {
      let cell = cell.as_ref();
      let pad = width - cell.chars().count();
      format!("{cell}{}", " ".repeat(pad))
    })
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(line.trim_end());
  out.push('\n');
}
