// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::style::TextStyle;

/// Default slide size in points (16:9).
pub const SLIDE_WIDTH: f64 = 960.0;
pub const SLIDE_HEIGHT: f64 = 540.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slide {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    #[serde(default)]
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "TextStyle::is_plain")]
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    TextBox,
    Rectangle,
    Ellipse,
    Line,
}

impl ShapeKind {
    pub const NAMES: [&'static str; 4] = ["text_box", "rectangle", "ellipse", "line"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextBox => "text_box",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "text_box" | "textbox" | "text" => Ok(Self::TextBox),
            "rectangle" | "rect" => Ok(Self::Rectangle),
            "ellipse" | "oval" => Ok(Self::Ellipse),
            "line" => Ok(Self::Line),
            _ => Err(()),
        }
    }
}

impl Slide {
    pub fn text_lines(&self) -> Vec<&str> {
        self.shapes.iter().map(|shape| shape.text.as_str()).filter(|t| !t.is_empty()).collect()
    }
}
