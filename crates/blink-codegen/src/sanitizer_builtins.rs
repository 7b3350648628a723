//! Builtin element and attribute lists for the Sanitizer API.

use crate::c_string_literal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const PROLOG: &str = r#"// Copyright 2021 The Chromium Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

// This file is automatically generated. Do not edit. Just generate.
// $ ninja -C ... generate_sanitizer_builtins

#include "third_party/blink/renderer/modules/sanitizer_api/builtins/sanitizer_builtins.h"

namespace blink {

"#;

const EPILOG: &str = "}  // namespace blink\n";

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultConfiguration {
    #[serde(rename = "allowElements")]
    pub allow_elements: Vec<String>,
    /// Attribute name to the elements it is allowed on. Only the keys are
    /// emitted, in file order.
    #[serde(rename = "allowAttributes")]
    pub allow_attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct Builtins {
    pub baseline_elements: Vec<String>,
    pub baseline_attributes: Vec<String>,
    pub default_configuration: DefaultConfiguration,
}

/// Appends `const char* const NAME[] = { ..., nullptr, };`.
pub fn string_list<'a>(out: &mut String, name: &str, items: impl IntoIterator<Item = &'a String>) {
    out.push_str(&format!("const char* const {}[] = {{\n", name));
    for item in items {
        out.push_str(&format!("  {},\n", c_string_literal(item)));
    }
    out.push_str("  nullptr,\n");
    out.push_str("};\n\n");
}

pub fn generate(builtins: &Builtins) -> String {
    let mut out = String::from(PROLOG);
    string_list(&mut out, "kBaselineElements", &builtins.baseline_elements);
    string_list(&mut out, "kBaselineAttributes", &builtins.baseline_attributes);
    string_list(
        &mut out,
        "kDefaultElements",
        &builtins.default_configuration.allow_elements,
    );
    string_list(
        &mut out,
        "kDefaultAttributes",
        builtins.default_configuration.allow_attributes.keys(),
    );
    out.push_str(EPILOG);
    out
}

/// A failed step: what was being done, and on which file.
#[derive(Debug)]
pub struct GenerateError {
    pub context: &'static str,
    pub path: PathBuf,
    pub source: anyhow::Error,
}

fn read_json<T: serde::de::DeserializeOwned>(
    context: &'static str,
    path: &Path,
) -> Result<T, GenerateError> {
    let err = |source: anyhow::Error| GenerateError {
        context,
        path: path.to_path_buf(),
        source,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| err(e.into()))?;
    serde_json::from_str(&raw).map_err(|e| err(e.into()))
}

/// Reads the three inputs and writes the generated source to `out`.
pub fn run(
    out: &Path,
    baseline_elements: &Path,
    baseline_attributes: &Path,
    default_configuration: &Path,
) -> Result<(), GenerateError> {
    let builtins = Builtins {
        baseline_elements: read_json("reading baseline elements", baseline_elements)?,
        baseline_attributes: read_json("reading baseline attributes", baseline_attributes)?,
        default_configuration: read_json("reading default configuration", default_configuration)?,
    };
    tracing::debug!(
        event = "sanitizer_builtins_loaded",
        baseline_elements = builtins.baseline_elements.len(),
        baseline_attributes = builtins.baseline_attributes.len()
    );

    std::fs::write(out, generate(&builtins)).map_err(|e| GenerateError {
        context: "writing output file",
        path: out.to_path_buf(),
        source: e.into(),
    })
}
