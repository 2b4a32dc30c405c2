//! Plain-text table rendering for frames.

use std::fmt::{Display, Write as _};
use std::io::Write;

use rust_decimal::Decimal;

use crate::error::FrameResult;
use crate::types::{FI2, FI3, FI4, Frame};

/// Rows shown by [`Frame::show_default`].
pub const DEFAULT_SHOW_ROWS: usize = 15;

/// A row that can be laid out as table cells.
pub trait Tabular {
    /// Column headers, one per cell.
    fn headers() -> Vec<String>;

    /// This row's cells, in header order.
    fn cells(&self) -> Vec<String>;
}

macro_rules! scalar_tabular {
    ($($t:ty),* $(,)?) => {
        $(
            impl Tabular for $t {
                fn headers() -> Vec<String> {
                    vec!["value".to_string()]
                }

                fn cells(&self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

scalar_tabular!(i32, i64, u32, u64, usize, f64, bool, String, &str, Decimal);

impl<C1: Display, C2: Display> Tabular for FI2<C1, C2> {
    fn headers() -> Vec<String> {
        vec!["c1".into(), "c2".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.c1.to_string(), self.c2.to_string()]
    }
}

impl<C1: Display, C2: Display, C3: Display> Tabular for FI3<C1, C2, C3> {
    fn headers() -> Vec<String> {
        vec!["c1".into(), "c2".into(), "c3".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.c1.to_string(), self.c2.to_string(), self.c3.to_string()]
    }
}

impl<C1: Display, C2: Display, C3: Display, C4: Display> Tabular for FI4<C1, C2, C3, C4> {
    fn headers() -> Vec<String> {
        vec!["c1".into(), "c2".into(), "c3".into(), "c4".into()]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.c1.to_string(),
            self.c2.to_string(),
            self.c3.to_string(),
            self.c4.to_string(),
        ]
    }
}

fn border(out: &mut String, widths: &[usize]) {
    out.push('+');
    for w in widths {
        out.push_str(&"-".repeat(w + 2));
        out.push('+');
    }
    out.push('\n');
}

fn line(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        // Writing into a String cannot fail.
        let _ = write!(out, " {cell:width$} |");
    }
    out.push('\n');
}

impl<T: Tabular> Frame<T> {
    /// Render the first `n` rows as an ASCII table.
    pub fn render(&self, n: usize) -> String {
        let headers = T::headers();
        let body: Vec<Vec<String>> = self.iter().take(n).map(Tabular::cells).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for cells in &body {
            for (w, cell) in widths.iter_mut().zip(cells) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        border(&mut out, &widths);
        line(&mut out, &headers, &widths);
        border(&mut out, &widths);
        for cells in &body {
            line(&mut out, cells, &widths);
        }
        border(&mut out, &widths);
        if self.len() > n {
            let _ = writeln!(out, "... ({} total rows, showing first {n})", self.len());
        }
        out
    }

    /// Write the first `n` rows as a table to `sink`.
    pub fn show_to<W: Write>(&self, sink: &mut W, n: usize) -> FrameResult<()> {
        sink.write_all(self.render(n).as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Print the first `n` rows to stdout.
    pub fn show(&self, n: usize) -> FrameResult<()> {
        self.show_to(&mut std::io::stdout().lock(), n)
    }

    /// Print the first [`DEFAULT_SHOW_ROWS`] rows to stdout.
    pub fn show_default(&self) -> FrameResult<()> {
        self.show(DEFAULT_SHOW_ROWS)
    }
}
