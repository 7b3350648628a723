//! `CSSPropertyID` enum and name table, generated from `css_properties.json5`.
//!
//! Ids 0 and 1 are reserved for `kInvalid` and `kVariable`. Real properties
//! follow, high priority first. An alias gets the id of the property it
//! aliases plus `alias_offset`, so masking the offset bit resolves it.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const FILE_BASENAME: &str = "css_property_names";
pub const FIRST_PROPERTY_ID: u32 = 2;

/// Top-level keys other than `data` (e.g. `parameters`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesFile {
    pub data: Vec<PropertyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(default)]
    pub alias_for: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub computable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub enum_key: String,
    pub enum_value: u32,
    pub high_priority: bool,
    pub computable: bool,
    pub alias_for: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CssProperties {
    pub properties: Vec<Property>,
    pub aliases: Vec<Property>,
    pub alias_offset: u32,
}

/// `-webkit-box-shadow` -> `WebkitBoxShadow`.
pub fn upper_camel_case(name: &str) -> String {
    name.split('-')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

impl CssProperties {
    pub fn from_entries(entries: Vec<PropertyEntry>) -> Result<Self> {
        let (alias_entries, mut property_entries): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.alias_for.is_some());

        // High priority first; stable, so file order holds within a priority.
        property_entries.sort_by_key(|e| e.priority.as_deref() != Some("High"));

        let mut properties = Vec::with_capacity(property_entries.len());
        let mut by_name: HashMap<String, u32> = HashMap::new();
        for (i, e) in property_entries.into_iter().enumerate() {
            let enum_value = FIRST_PROPERTY_ID + i as u32;
            if by_name.insert(e.name.clone(), enum_value).is_some() {
                bail!("duplicate property name '{}'", e.name);
            }
            properties.push(Property {
                enum_key: format!("k{}", upper_camel_case(&e.name)),
                enum_value,
                high_priority: e.priority.as_deref() == Some("High"),
                computable: e.computable.unwrap_or(!e.name.starts_with("-internal-")),
                alias_for: None,
                name: e.name,
            });
        }

        let last_property_id = properties
            .last()
            .map(|p| p.enum_value)
            .unwrap_or(FIRST_PROPERTY_ID - 1);
        let alias_offset = (last_property_id + 1).next_power_of_two();

        let mut aliases = Vec::with_capacity(alias_entries.len());
        for e in alias_entries {
            let target = e.alias_for.clone().unwrap_or_default();
            let Some(target_value) = by_name.get(&target) else {
                bail!("alias '{}' refers to unknown property '{}'", e.name, target);
            };
            aliases.push(Property {
                enum_key: format!("kAlias{}", upper_camel_case(&e.name)),
                enum_value: alias_offset + target_value,
                high_priority: false,
                computable: false,
                alias_for: Some(target),
                name: e.name,
            });
        }

        Ok(Self {
            properties,
            aliases,
            alias_offset,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: PropertiesFile =
            json5::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
        Self::from_entries(file.data)
    }

    pub fn including_aliases(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().chain(self.aliases.iter())
    }

    pub fn first_property_id(&self) -> u32 {
        FIRST_PROPERTY_ID
    }

    pub fn last_property_id(&self) -> u32 {
        self.properties
            .last()
            .map(|p| p.enum_value)
            .unwrap_or(FIRST_PROPERTY_ID - 1)
    }

    pub fn last_unresolved_property_id(&self) -> u32 {
        self.including_aliases()
            .map(|p| p.enum_value)
            .max()
            .unwrap_or(FIRST_PROPERTY_ID - 1)
    }

    pub fn last_high_priority_property_id(&self) -> u32 {
        self.properties
            .iter()
            .filter(|p| p.high_priority)
            .map(|p| p.enum_value)
            .max()
            .unwrap_or(FIRST_PROPERTY_ID - 1)
    }

    pub fn property_id_bit_length(&self) -> u32 {
        u32::BITS - self.last_unresolved_property_id().leading_zeros()
    }

    /// Computable properties, vendor-prefixed ones last.
    pub fn computable(&self) -> Vec<&Property> {
        let mut out: Vec<_> = self.properties.iter().filter(|p| p.computable).collect();
        out.sort_by(|a, b| {
            (a.name.starts_with('-'), &a.name).cmp(&(b.name.starts_with('-'), &b.name))
        });
        out
    }

    pub fn max_name_length(&self) -> usize {
        self.including_aliases().map(|p| p.name.len()).max().unwrap_or(0)
    }
}

pub fn generate_header(props: &CssProperties) -> String {
    let enums: Vec<String> = props
        .including_aliases()
        .map(|p| format!("    {} = {},", p.enum_key, p.enum_value))
        .collect();
    let alias_items: Vec<String> = props
        .aliases
        .iter()
        .map(|p| format!("    CSSPropertyID::{},", p.enum_key))
        .collect();
    let computable_items: Vec<String> = props
        .computable()
        .iter()
        .map(|p| format!("    CSSPropertyID::{},", p.enum_key))
        .collect();
    let alias_mask = 0xffff_ffffu32 - props.alias_offset + 1;
    let properties_count = props.properties.len() + props.aliases.len();

    format!(
        r#"// Generated from css_properties.json5. Do not edit.

#ifndef THIRD_PARTY_BLINK_RENDERER_CORE_CSS_CSS_PROPERTY_NAMES_H_
#define THIRD_PARTY_BLINK_RENDERER_CORE_CSS_CSS_PROPERTY_NAMES_H_

#include <stddef.h>

namespace blink {{

enum class CSSPropertyID {{
    kInvalid = 0,
    kVariable = 1,
{enums}
}};

const CSSPropertyID kCSSPropertyAliasList[] = {{
{aliases}
}};

const CSSPropertyID kCSSComputableProperties[] = {{
{computable}
}};

const int kIntFirstCSSProperty = {first};
const CSSPropertyID kFirstCSSProperty = static_cast<CSSPropertyID>({first});
const int kIntLastCSSProperty = {last};
const CSSPropertyID kLastCSSProperty = static_cast<CSSPropertyID>({last});
const CSSPropertyID kLastUnresolvedCSSProperty = static_cast<CSSPropertyID>({last_unresolved});
const CSSPropertyID kLastHighPriorityCSSProperty = static_cast<CSSPropertyID>({last_high});
const int kNumCSSProperties = {count};
const int kNumCSSPropertyIDs = kIntLastCSSProperty + 1;
const size_t kMaxCSSPropertyNameLength = {max_len};
constexpr size_t kCSSPropertyIDBitLength = {bits};

inline bool IsPropertyAlias(CSSPropertyID id) {{
  return static_cast<int>(id) & {alias_offset};
}}

inline CSSPropertyID ResolveCSSPropertyID(CSSPropertyID id) {{
  return static_cast<CSSPropertyID>(static_cast<int>(id) & ~{alias_mask:#x});
}}

const char* GetPropertyName(CSSPropertyID);
CSSPropertyID CssPropertyID(const char* name, size_t length);

}}  // namespace blink

#endif  // THIRD_PARTY_BLINK_RENDERER_CORE_CSS_CSS_PROPERTY_NAMES_H_
"#,
        enums = enums.join("\n"),
        aliases = alias_items.join("\n"),
        computable = computable_items.join("\n"),
        first = props.first_property_id(),
        last = props.last_property_id(),
        last_unresolved = props.last_unresolved_property_id(),
        last_high = props.last_high_priority_property_id(),
        count = properties_count,
        max_len = props.max_name_length(),
        bits = props.property_id_bit_length(),
        alias_offset = props.alias_offset,
        alias_mask = alias_mask,
    )
}

/// Offset of each id's name in the string pool, for every id from the first
/// property up to the last alias. Unused ids share the next name's offset.
pub fn name_offsets(props: &CssProperties) -> (Vec<&str>, Vec<usize>) {
    let by_value: HashMap<u32, &str> = props
        .including_aliases()
        .map(|p| (p.enum_value, p.name.as_str()))
        .collect();
    let mut names = Vec::new();
    let mut offsets = Vec::new();
    let mut current = 0;
    for value in props.first_property_id()..=props.last_unresolved_property_id() {
        offsets.push(current);
        if let Some(name) = by_value.get(&value) {
            names.push(*name);
            current += name.len() + 1;
        }
    }
    (names, offsets)
}

pub fn generate_implementation(props: &CssProperties) -> String {
    let (names, offsets) = name_offsets(props);
    let pool: Vec<String> = names.iter().map(|n| format!("    \"{}\\0\"", n)).collect();
    let pool_text = if pool.is_empty() {
        "    \"\";".to_string()
    } else {
        format!("{};", pool.join("\n"))
    };
    let offset_items: Vec<String> = offsets.iter().map(|o| format!("    {},", o)).collect();

    let mut lookup: Vec<&Property> = props.including_aliases().collect();
    lookup.sort_by(|a, b| a.name.cmp(&b.name));
    let lookup_items: Vec<String> = lookup
        .iter()
        .map(|p| {
            format!(
                "    {{\"{}\", static_cast<int>(CSSPropertyID::{})}},",
                p.name, p.enum_key
            )
        })
        .collect();

    format!(
        r#"// Generated from css_properties.json5. Do not edit.

#include "third_party/blink/renderer/core/css/{basename}.h"

#include <string.h>
#include <algorithm>

namespace blink {{

static constexpr char kCSSPropertyNameStringPool[] =
{pool};

static constexpr unsigned kCSSPropertyNameStringOffsets[] = {{
{offsets}
}};

struct CSSPropertyNameEntry {{
  const char* name;
  int id;
}};

// Sorted by name.
static constexpr CSSPropertyNameEntry kCSSPropertyNameTable[] = {{
{lookup}
}};

const char* GetPropertyName(CSSPropertyID id) {{
  int index = static_cast<int>(id) - {first};
  if (index < 0 || index >= {offset_count})
    return nullptr;
  return kCSSPropertyNameStringPool + kCSSPropertyNameStringOffsets[index];
}}

CSSPropertyID CssPropertyID(const char* name, size_t length) {{
  const CSSPropertyNameEntry* begin = kCSSPropertyNameTable;
  const CSSPropertyNameEntry* end = begin + {lookup_count};
  const CSSPropertyNameEntry* it = std::lower_bound(
      begin, end, name, [length](const CSSPropertyNameEntry& e, const char* n) {{
        return strncmp(e.name, n, length) < 0 ||
               (strncmp(e.name, n, length) == 0 && strlen(e.name) < length);
      }});
  if (it == end || strlen(it->name) != length || strncmp(it->name, name, length))
    return CSSPropertyID::kInvalid;
  return static_cast<CSSPropertyID>(it->id);
}}

}}  // namespace blink
"#,
        basename = FILE_BASENAME,
        pool = pool_text,
        offsets = offset_items.join("\n"),
        lookup = lookup_items.join("\n"),
        first = props.first_property_id(),
        offset_count = offsets.len(),
        lookup_count = lookup.len(),
    )
}

/// Writes `css_property_names.h` and `.cc` into `output_dir`.
pub fn write_outputs(props: &CssProperties, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    for (ext, text) in [
        ("h", generate_header(props)),
        ("cc", generate_implementation(props)),
    ] {
        let path = output_dir.join(format!("{}.{}", FILE_BASENAME, ext));
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(event = "generated", file = %path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> PropertyEntry {
        PropertyEntry {
            name: name.to_string(),
            alias_for: None,
            priority: None,
            computable: None,
        }
    }

    fn sample() -> CssProperties {
        let mut color = entry("color");
        color.priority = Some("High".to_string());
        let mut alias = entry("-webkit-opacity");
        alias.alias_for = Some("opacity".to_string());
        CssProperties::from_entries(vec![
            entry("opacity"),
            entry("-webkit-box-shadow"),
            alias,
            color,
            entry("-internal-visited-color"),
        ])
        .unwrap()
    }

    #[test]
    fn test_upper_camel_case() {
        assert_eq!(upper_camel_case("-webkit-box-shadow"), "WebkitBoxShadow");
        assert_eq!(upper_camel_case("color"), "Color");
    }

    #[test]
    fn test_ids_and_aliases() {
        let props = sample();
        let keys: Vec<_> = props.properties.iter().map(|p| (p.enum_key.as_str(), p.enum_value)).collect();
        assert_eq!(
            keys,
            vec![
                ("kColor", 2),
                ("kOpacity", 3),
                ("kWebkitBoxShadow", 4),
                ("kInternalVisitedColor", 5),
            ]
        );
        assert_eq!(props.last_property_id(), 5);
        assert_eq!(props.alias_offset, 8);
        assert_eq!(props.aliases[0].enum_key, "kAliasWebkitOpacity");
        assert_eq!(props.aliases[0].enum_value, 8 + 3);
        assert_eq!(props.last_unresolved_property_id(), 11);
        assert_eq!(props.last_high_priority_property_id(), 2);
        assert_eq!(props.property_id_bit_length(), 4);
        assert_eq!(props.max_name_length(), "-internal-visited-color".len());
    }

    #[test]
    fn test_same_priority_keeps_file_order() {
        let props = CssProperties::from_entries(vec![entry("opacity"), entry("color")]).unwrap();
        let keys: Vec<_> = props.properties.iter().map(|p| (p.name.as_str(), p.enum_value)).collect();
        assert_eq!(keys, vec![("opacity", 2), ("color", 3)]);

        let mut high = entry("z-index");
        high.priority = Some("High".to_string());
        let props = CssProperties::from_entries(vec![entry("opacity"), entry("color"), high]).unwrap();
        let names: Vec<_> = props.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["z-index", "opacity", "color"]);
    }

    #[test]
    fn test_computable_order_excludes_internal() {
        let props = sample();
        let names: Vec<_> = props.computable().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["color", "opacity", "-webkit-box-shadow"]);
    }

    #[test]
    fn test_unknown_alias_target_fails() {
        let mut alias = entry("-webkit-foo");
        alias.alias_for = Some("foo".to_string());
        assert!(CssProperties::from_entries(vec![entry("color"), alias]).is_err());
    }

    #[test]
    fn test_name_offsets_cover_alias_range() {
        let props = sample();
        let (names, offsets) = name_offsets(&props);
        assert_eq!(offsets.len(), (11 - 2 + 1) as usize);
        assert_eq!(names.first(), Some(&"color"));
        assert_eq!(names.last(), Some(&"-webkit-opacity"));
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], "color".len() + 1);
    }

    #[test]
    fn test_header_contents() {
        let h = generate_header(&sample());
        assert!(h.contains("    kColor = 2,\n"));
        assert!(h.contains("    kAliasWebkitOpacity = 11,\n"));
        assert!(h.contains("const int kNumCSSProperties = 5;"));
        assert!(h.contains("& ~0xfffffff8"));
        let cc = generate_implementation(&sample());
        assert!(cc.contains("{\"-webkit-opacity\", static_cast<int>(CSSPropertyID::kAliasWebkitOpacity)},"));
    }
}
