//! Basket line items.

use crate::error::BasketError;
use crate::ids::{ItemKey, ProductId};
use crate::tax::Tax;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Field names with a typed home on [`Item`]; everything else is an
/// extension attribute.
pub const RESERVED_FIELDS: [&str; 8] = [
    "identifier",
    "id",
    "name",
    "price",
    "quantity",
    "weight",
    "tax",
    "options",
];

/// Fields `Basket::insert` refuses to go without, in check order.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "quantity", "price", "weight"];

/// An option attached to an item, e.g. a size or an engraving.
///
/// `price` and `weight` are added to the item's unit price and weight
/// when present; any other fields only take part in the item's key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    /// Price added to the item's unit price.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    /// Weight added to the item's unit weight.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    /// Descriptive fields (name, value, ...). Never holds `price` or `weight`.
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl ItemOption {
    /// Create an empty option.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price delta.
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the weight delta.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Add a descriptive field.
    ///
    /// `price` and `weight` set the deltas instead; a value that isn't a
    /// number or numeric string clears the delta.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "price" => self.price = coerce_number(&value),
            "weight" => self.weight = coerce_number(&value),
            _ => {
                self.fields.insert(name, value);
            }
        }
        self
    }

    /// Descriptive fields, without the price and weight deltas.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Canonical JSON for this option: keys sorted at every level.
    fn canonical(&self) -> String {
        let mut entries: BTreeMap<&str, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        if let Some(price) = self.price {
            entries.insert("price", Value::from(price));
        }
        if let Some(weight) = self.weight {
            entries.insert("weight", Value::from(weight));
        }

        let body: Vec<String> = entries
            .iter()
            .map(|(k, v)| format!("{}:{}", Value::from(*k), canonical_json(v)))
            .collect();
        format!("{{{}}}", body.join(","))
    }
}

// Sorts explicitly so keys stay stable even if serde_json's
// `preserve_order` feature gets enabled somewhere in the build.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let body: Vec<String> = sorted
                .iter()
                .map(|(k, v)| format!("{}:{}", Value::from(k.as_str()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}

impl ItemKey {
    /// Derive the storage key for a catalog id and option set.
    ///
    /// The key is the lowercase hex MD5 of the catalog id followed by the
    /// canonical JSON array of the options. Options are ordered by their
    /// own encoding first, so the order they were attached in does not
    /// matter.
    ///
    /// ```
    /// use turbo_basket::{ItemKey, ItemOption, ProductId};
    ///
    /// let size = ItemOption::new().field("size", "L");
    /// let gift = ItemOption::new().field("gift", true).price(2.5);
    /// let id = ProductId::new("tee");
    ///
    /// assert_eq!(
    ///     ItemKey::derive(&id, &[size.clone(), gift.clone()]),
    ///     ItemKey::derive(&id, &[gift, size]),
    /// );
    /// ```
    pub fn derive(id: &ProductId, options: &[ItemOption]) -> Self {
        let mut encoded: Vec<String> = options.iter().map(ItemOption::canonical).collect();
        encoded.sort();
        let payload = format!("{}[{}]", id, encoded.join(","));
        Self::new(format!("{:x}", md5::compute(payload)))
    }
}

/// Coerce a JSON value to a float: numbers and numeric strings.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Coerce a JSON value to a whole number.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional number leniently, the way form input arrives:
/// numbers and numeric strings are accepted, anything else becomes `None`
/// instead of failing the whole record.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_integer))
}

/// Strings, numbers and booleans all read as text.
fn lenient_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_text).map(T::from))
}

/// An item as handed to `Basket::insert`.
///
/// Every field is optional so a missing one can be reported by name.
///
/// ```
/// use turbo_basket::NewItem;
///
/// let item: NewItem = serde_json::from_str(
///     r#"{"id": "foo", "name": "bar", "price": 100, "quantity": 1, "weight": 200, "color": "red"}"#,
/// ).unwrap();
/// assert_eq!(item.price, Some(100.0));
/// assert_eq!(item.attributes["color"], "red");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    /// Explicit derived key; computed from `id` and `options` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<ItemKey>,
    /// Catalog id.
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<ProductId>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Quantity.
    #[serde(default, deserialize_with = "lenient_integer")]
    pub quantity: Option<i64>,
    /// Unit price, excluding tax.
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    /// Unit weight.
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    /// Tax percentage, 0 when absent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub tax: Option<f64>,
    /// Options, may be empty.
    #[serde(default)]
    pub options: Vec<ItemOption>,
    /// Extension attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl NewItem {
    /// Start an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn tax(mut self, percentage: f64) -> Self {
        self.tax = Some(percentage);
        self
    }

    pub fn option(mut self, option: ItemOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn identifier(mut self, key: impl Into<ItemKey>) -> Self {
        self.identifier = Some(key.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Fail with the first required field that is absent.
    pub fn check_required(&self) -> Result<(), BasketError> {
        let present = [
            self.id.is_some(),
            self.name.is_some(),
            self.quantity.is_some(),
            self.price.is_some(),
            self.weight.is_some(),
        ];
        match REQUIRED_FIELDS.iter().zip(present).find(|(_, ok)| !ok) {
            Some((field, _)) => Err(BasketError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// The explicit key if one was given, otherwise the derived one.
    pub fn item_key(&self) -> Option<ItemKey> {
        self.identifier
            .clone()
            .or_else(|| self.id.as_ref().map(|id| ItemKey::derive(id, &self.options)))
    }
}

/// A partial update applied by [`Item::merge`].
///
/// `Some` fields overwrite, `None` fields are left alone, attributes
/// overwrite key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<ProductId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tax: Option<f64>,
    pub options: Option<Vec<ItemOption>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn tax(mut self, percentage: f64) -> Self {
        self.tax = Some(percentage);
        self
    }

    pub fn options(mut self, options: Vec<ItemOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl From<NewItem> for ItemPatch {
    fn from(item: NewItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
            weight: item.weight,
            tax: item.tax,
            options: (!item.options.is_empty()).then_some(item.options),
            attributes: item.attributes,
        }
    }
}

/// A single basket line.
///
/// Totals are never stored; they are recomputed from price, quantity,
/// weight, tax and options on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<ItemKey>,
    id: ProductId,
    name: String,
    price: f64,
    quantity: i64,
    weight: f64,
    #[serde(default)]
    tax: Tax,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<ItemOption>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Item {
    /// Build an item, failing on the first missing required field.
    pub fn new(fields: NewItem) -> Result<Self, BasketError> {
        fields.check_required()?;
        let NewItem {
            identifier,
            id,
            name,
            quantity,
            price,
            weight,
            tax,
            options,
            attributes,
        } = fields;

        let mut item = Self {
            identifier,
            id: id.unwrap_or_else(|| ProductId::new("")),
            name: name.unwrap_or_default(),
            price: price.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            weight: weight.unwrap_or_default(),
            tax: Tax::new(tax.unwrap_or_default()),
            options,
            attributes: Map::new(),
        };
        for (key, value) in attributes {
            item.set_attribute(key, value);
        }
        Ok(item)
    }

    /// Derived storage key, set once the item is inserted.
    pub fn identifier(&self) -> Option<&ItemKey> {
        self.identifier.as_ref()
    }

    pub fn set_identifier(&mut self, key: ItemKey) {
        self.identifier = Some(key);
    }

    /// Catalog id.
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Unit price, excluding tax and options.
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = price;
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Set the quantity. Not validated: 0 or negative is stored as given.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    /// Unit weight, excluding options.
    pub fn unit_weight(&self) -> f64 {
        self.weight
    }

    pub fn set_unit_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// The tax applied to this item.
    pub fn tax_rate(&self) -> &Tax {
        &self.tax
    }

    /// Replace the tax with a new percentage.
    pub fn set_tax(&mut self, percentage: f64) {
        self.tax = Tax::new(percentage);
    }

    pub fn options(&self) -> &[ItemOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<ItemOption>) {
        self.options = options;
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Read an extension attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Set an extension attribute. Names of typed fields are routed
    /// through [`Item::update`] so they can't shadow the real field.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if RESERVED_FIELDS.contains(&key.as_str()) {
            self.update(&key, value);
        } else {
            self.attributes.insert(key, value);
        }
    }

    /// Update a single field from a loosely typed value.
    ///
    /// Numeric fields accept numbers and numeric strings. A value that
    /// can't be coerced is ignored and the field keeps its old value.
    /// Returns whether the field changed.
    pub fn update(&mut self, field: &str, value: Value) -> bool {
        let applied = match field {
            "identifier" => {
                debug!("identifier is assigned by the basket, ignoring update");
                return false;
            }
            "id" => coerce_text(&value).map(|id| self.id = ProductId::new(id)),
            "name" => coerce_text(&value).map(|name| self.name = name),
            "price" => coerce_number(&value).map(|price| self.price = price),
            "weight" => coerce_number(&value).map(|weight| self.weight = weight),
            "quantity" => coerce_integer(&value).map(|quantity| self.quantity = quantity),
            "tax" => coerce_number(&value).map(|tax| self.set_tax(tax)),
            "options" => serde_json::from_value::<Vec<ItemOption>>(value.clone())
                .ok()
                .map(|options| self.options = options),
            _ => {
                self.attributes.insert(field.to_string(), value);
                return true;
            }
        };

        if applied.is_none() {
            warn!(field, %value, "ignoring update with a value of the wrong type");
        }
        applied.is_some()
    }

    /// Apply a partial update.
    pub fn merge(&mut self, patch: ItemPatch) {
        let ItemPatch {
            id,
            name,
            quantity,
            price,
            weight,
            tax,
            options,
            attributes,
        } = patch;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(quantity) = quantity {
            self.quantity = quantity;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(weight) = weight {
            self.weight = weight;
        }
        if let Some(tax) = tax {
            self.set_tax(tax);
        }
        if let Some(options) = options {
            self.options = options;
        }
        for (key, value) in attributes {
            self.set_attribute(key, value);
        }
    }

    /// Unit price plus every option price.
    fn total_price(&self) -> f64 {
        self.price + self.options.iter().filter_map(|o| o.price).sum::<f64>()
    }

    /// Tax on the whole line.
    pub fn tax(&self) -> f64 {
        self.tax.rate(self.total_price() * self.quantity as f64)
    }

    /// Line total, with or without tax.
    pub fn total(&self, include_tax: bool) -> f64 {
        self.single(include_tax) * self.quantity as f64
    }

    /// Price of one unit including options, with or without tax.
    pub fn single(&self, include_tax: bool) -> f64 {
        let price = self.total_price();
        if include_tax {
            self.tax.add(price)
        } else {
            price
        }
    }

    /// Line weight including option weights.
    pub fn weight(&self) -> f64 {
        let unit = self.weight + self.options.iter().filter_map(|o| o.weight).sum::<f64>();
        unit * self.quantity as f64
    }

    /// Flatten to a plain field map, extension attributes included.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id.as_str()));
        map.insert("name".into(), Value::from(self.name.as_str()));
        map.insert("price".into(), Value::from(self.price));
        map.insert("quantity".into(), Value::from(self.quantity));
        map.insert("weight".into(), Value::from(self.weight));
        map.insert("tax".into(), Value::from(self.tax.percentage()));
        if self.has_options() {
            let options = self
                .options
                .iter()
                .map(|o| serde_json::to_value(o).unwrap_or(Value::Null))
                .collect();
            map.insert("options".into(), Value::Array(options));
        }
        for (key, value) in &self.attributes {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}
