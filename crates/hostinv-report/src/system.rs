//! System report

use std::fmt::Write;

use hostinv_inventory::{InfoLevel, InfoMap, SystemSnapshot};
use serde_json::{Map, Value, json};

use crate::csv::push_row;
use crate::render::{Render, json_key};
use crate::style::Palette;

const KEY_WIDTH: usize = 25;

/// A system snapshot viewed at one info level
#[derive(Debug, Clone, Copy)]
pub struct SystemReport<'a> {
    snapshot: &'a SystemSnapshot,
    level: InfoLevel,
}

impl<'a> SystemReport<'a> {
    pub fn new(snapshot: &'a SystemSnapshot, level: InfoLevel) -> Self {
        Self { snapshot, level }
    }

    fn info(&self) -> &InfoMap {
        self.snapshot.info(self.level)
    }
}

fn line(out: &mut String, palette: &Palette, key: &str, value: &str) {
    let _ = writeln!(out, "{}: {value}", palette.key(&format!("{key:<KEY_WIDTH$}")));
}

impl Render for SystemReport<'_> {
    fn to_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", palette.title("\n=== hostinv System Information ==="));

        for (key, value) in self.info().iter() {
            line(&mut out, palette, key, value);
        }

        if let Some(load) = self.snapshot.load_average {
            line(
                &mut out,
                palette,
                "Load Average (1,5,15 min)",
                &format!("{:.2}, {:.2}, {:.2}", load.one, load.five, load.fifteen),
            );
        }

        if !self.snapshot.logged_users.is_empty() {
            line(
                &mut out,
                palette,
                "Logged Users",
                &self.snapshot.logged_users.join(", "),
            );
        }

        out
    }

    fn json_value(&self) -> Value {
        let mut info = Map::new();
        for (key, value) in self.info().iter() {
            info.insert(json_key(key), Value::from(value));
        }

        if let Some(load) = self.snapshot.load_average {
            info.insert(
                "load_average".to_string(),
                json!({
                    "1_min": load.one,
                    "5_min": load.five,
                    "15_min": load.fifteen,
                }),
            );
        }
        info.insert(
            "logged_users".to_string(),
            json!(self.snapshot.logged_users),
        );

        json!({ "system_info": info })
    }

    fn to_csv(&self) -> String {
        let mut out = String::new();
        push_row(&mut out, &["Key", "Value"]);
        for (key, value) in self.info().iter() {
            push_row(&mut out, &[key, value]);
        }
        out
    }
}
