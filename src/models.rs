use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============ Shared field types ============

/// Identifier the backend sends either as a JSON number or as a string.
///
/// Equality is structural (`1` and `"1"` differ); use [`FlexId::as_text`]
/// when two sources must be compared by their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexId {
    Int(i64),
    Text(String),
}

impl FlexId {
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexId::Int(n) => write!(f, "{}", n),
            FlexId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FlexId {
    fn from(value: i64) -> Self {
        FlexId::Int(value)
    }
}

impl From<&str> for FlexId {
    fn from(value: &str) -> Self {
        FlexId::Text(value.to_string())
    }
}

/// Amount accepted either as a number or as text. Not coerced on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexAmount {
    Number(f64),
    Text(String),
}

impl FlexAmount {
    /// Numeric reading of the amount; text that does not parse yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlexAmount::Number(n) => Some(*n),
            FlexAmount::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Deserializes a field that must be present but may be `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// First candidate that is present and non-empty, mirroring `a || b || c`.
fn first_text<'a>(candidates: &[Option<&'a String>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.as_str())
        .find(|s| !s.is_empty())
}

// ============ Reference data ============

/// Document type reference record (e.g. "CC", "CE", "TI", "PAS").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Internal join key used by the backend.
    pub id: i64,
    pub name: String,
    /// External-facing key, matched case-insensitively.
    pub abbreviation: String,
}

// ============ Users ============

/// A registered user. Unknown backend fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: FlexId,
    pub user_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type_id: Option<FlexId>,
    pub document_number: Option<FlexId>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// `userName` when set, otherwise "first last" trimmed.
    pub fn display_name(&self) -> String {
        if let Some(name) = first_text(&[self.user_name.as_ref()]) {
            return name.to_string();
        }
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Document the current session was queried with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub document_type_id: i64,
    pub document_number: String,
}

// ============ Infractions ============

/// A traffic fine as returned by `/api/UserInfraction`.
///
/// The backend has renamed fields between releases, so several aliases exist
/// for the amount, dates, type and description. Read them through the
/// accessor methods, which try the aliases in a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infraction {
    pub id: Option<FlexId>,
    pub user_id: Option<FlexId>,
    pub user_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub type_infraction_name: Option<String>,
    pub tipo: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub observations: Option<String>,
    pub description: Option<String>,
    pub descripcion: Option<String>,
    pub valor: Option<f64>,
    pub amount: Option<f64>,
    pub monto: Option<FlexAmount>,
    pub total: Option<f64>,
    pub amount_to_pay: Option<f64>,
    pub fecha_max: Option<String>,
    pub due_date: Option<String>,
    #[serde(rename = "fecha_max")]
    pub fecha_max_legacy: Option<String>,
    pub number: Option<String>,
    pub fecha: Option<String>,
    pub date: Option<String>,
    pub date_infraction: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Infraction {
    /// Type label: `typeInfractionName`, then `tipo`, then `type`.
    pub fn type_label(&self) -> Option<&str> {
        first_text(&[
            self.type_infraction_name.as_ref(),
            self.tipo.as_ref(),
            self.kind.as_ref(),
        ])
    }

    /// Description: `observations`, then `description`, then `descripcion`.
    pub fn description_text(&self) -> Option<&str> {
        first_text(&[
            self.observations.as_ref(),
            self.description.as_ref(),
            self.descripcion.as_ref(),
        ])
    }

    /// Amount due: `amountToPay`, then `valor`, `amount`, `monto`, `total`.
    ///
    /// The first present alias wins even when it is not numeric.
    pub fn amount_due(&self) -> Option<f64> {
        if let Some(v) = self.amount_to_pay.or(self.valor).or(self.amount) {
            return Some(v);
        }
        match &self.monto {
            Some(monto) => monto.as_f64(),
            None => self.total,
        }
    }

    /// Amount used for listing totals: `value`, then `amount`, then `total`.
    ///
    /// `value` is not part of the schema and is read from the preserved
    /// extra fields. Missing or non-numeric amounts count as zero.
    pub fn listing_amount(&self) -> f64 {
        if let Some(value) = self.extra.get("value").filter(|v| !v.is_null()) {
            return numeric(value);
        }
        self.amount.or(self.total).unwrap_or(0.0)
    }

    /// Infraction date: `fecha`, then `date`, then `dateInfraction`.
    pub fn infraction_date(&self) -> Option<&str> {
        first_text(&[
            self.fecha.as_ref(),
            self.date.as_ref(),
            self.date_infraction.as_ref(),
        ])
    }

    /// Payment deadline: `fechaMax`, then `dueDate`, then `fecha_max`.
    pub fn due_date_text(&self) -> Option<&str> {
        first_text(&[
            self.fecha_max.as_ref(),
            self.due_date.as_ref(),
            self.fecha_max_legacy.as_ref(),
        ])
    }

    /// Citation number: `number`, then `id`.
    pub fn reference_number(&self) -> Option<String> {
        first_text(&[self.number.as_ref()])
            .map(str::to_string)
            .or_else(|| self.id.as_ref().map(FlexId::as_text))
    }

    /// Name used by search: `userName`, then a nested `user.userName`.
    pub fn search_user_name(&self) -> Option<&str> {
        first_text(&[self.user_name.as_ref()]).or_else(|| {
            self.extra
                .get("user")
                .and_then(|u| u.get("userName"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    }
}

/// Numeric reading of a loosely typed JSON value; anything else is zero.
pub fn numeric(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// Filter for an infraction query. Unset filters request the full listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfractionFilter {
    pub document_type_id: Option<i64>,
    pub document_number: Option<String>,
}

// ============ Payment agreements ============

/// Installment agreement for outstanding fines.
///
/// The backend never fixed the types of the display-only fields (fine type,
/// infringement, end date, amounts, flags), so they are kept as raw JSON and
/// read through the accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAgreement {
    pub id: FlexId,
    pub person_name: Option<String>,
    pub document_number: Option<FlexId>,
    pub document: Option<FlexId>,
    pub phone_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub type_fine: Option<Value>,
    pub infringement: Option<Value>,
    pub agreement_start: Option<String>,
    pub start_date: Option<String>,
    pub agreement_end: Option<Value>,
    pub quota_value: Option<f64>,
    pub amount: Option<f64>,
    pub quota_quantity: Option<f64>,
    pub quantity: Option<f64>,
    pub installments: Option<Value>,
    pub base_amount: Option<Value>,
    pub monthly_fee: Option<Value>,
    pub outstanding_amount: Option<Value>,
    pub pay_day: Option<String>,
    pub payment_date: Option<String>,
    pub payment_method: Option<String>,
    pub method: Option<String>,
    pub observations: Option<String>,
    pub notes: Option<String>,
    pub is_coactive: Option<Value>,
    pub is_paid: Option<Value>,
    pub created_date: Option<String>,
    pub modified_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentAgreement {
    /// Document number as text: `documentNumber`, then `document`, trimmed.
    pub fn document_text(&self) -> String {
        self.document_number
            .as_ref()
            .map(FlexId::as_text)
            .filter(|s| !s.is_empty())
            .or_else(|| self.document.as_ref().map(FlexId::as_text))
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Installment amount: `quotaValue`, then `amount`.
    pub fn quota_amount(&self) -> Option<f64> {
        self.quota_value.or(self.amount)
    }

    /// Start date: `agreementStart`, then `startDate`.
    pub fn start(&self) -> Option<&str> {
        first_text(&[self.agreement_start.as_ref(), self.start_date.as_ref()])
    }

    /// Contact phone: `phoneNumber`, then `phone`.
    pub fn contact_phone(&self) -> Option<&str> {
        first_text(&[self.phone_number.as_ref(), self.phone.as_ref()])
    }

    /// Payment method: `paymentMethod`, then `method`.
    pub fn method_label(&self) -> Option<&str> {
        first_text(&[self.payment_method.as_ref(), self.method.as_ref()])
    }

    pub fn fine_type(&self) -> Option<String> {
        self.type_fine.as_ref().and_then(loose_text)
    }

    pub fn infringement_text(&self) -> Option<String> {
        self.infringement.as_ref().and_then(loose_text)
    }

    pub fn end(&self) -> Option<String> {
        self.agreement_end.as_ref().and_then(loose_text)
    }

    /// Remaining balance; non-numeric values count as zero.
    pub fn outstanding(&self) -> Option<f64> {
        self.outstanding_amount.as_ref().map(numeric)
    }

    pub fn paid(&self) -> Option<bool> {
        self.is_paid.as_ref().and_then(loose_flag)
    }

    pub fn coactive(&self) -> Option<bool> {
        self.is_coactive.as_ref().and_then(loose_flag)
    }
}

/// Text form of a string, number or boolean.
fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flag sent as a boolean, a 0/1 number or "true"/"false" text.
fn loose_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ============ Payments ============

/// Checkout preference issued by the backend for one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreference {
    pub preference_id: String,
    pub init_point: String,
    pub sandbox_init_point: String,
    pub amount: f64,
    pub payment_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentPreference {
    /// URL the user is redirected to for checkout.
    pub fn checkout_url(&self, sandbox: bool) -> &str {
        if sandbox {
            &self.sandbox_init_point
        } else {
            &self.init_point
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatusKind {
    Pending,
    Approved,
    InProcess,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatusKind {
    /// True once the payment can no longer change state.
    pub fn is_final(self) -> bool {
        !matches!(self, PaymentStatusKind::Pending | PaymentStatusKind::InProcess)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfraction {
    pub id: i64,
    pub state_infraction: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub id: i64,
    pub amount: f64,
    pub status: PaymentStatusKind,
    pub status_description: String,
    #[serde(deserialize_with = "nullable")]
    pub paid_at: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub mercado_pago_payment_id: Option<i64>,
    #[serde(deserialize_with = "nullable")]
    pub payment_method: Option<String>,
    pub infraction: PaymentInfraction,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPaymentInfraction {
    pub id: i64,
    pub description: String,
    pub date_infraction: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a user's payment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayment {
    pub id: i64,
    pub amount: f64,
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub paid_at: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub payment_method: Option<String>,
    #[serde(rename = "created_date")]
    pub created_date: String,
    pub infraction: UserPaymentInfraction,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHealth {
    pub status: String,
    pub database: String,
    pub payments_table: String,
    pub payments_count: u64,
    pub mercado_pago: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of the payment health check.
///
/// Health consumers tolerate shape drift, so a payload that fails validation
/// is handed back raw instead of failing the call.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthReport {
    Validated(PaymentHealth),
    Raw(Value),
}

impl HealthReport {
    /// Reported `status` field, when there is one.
    pub fn status(&self) -> Option<&str> {
        match self {
            HealthReport::Validated(health) => Some(&health.status),
            HealthReport::Raw(value) => value.get("status").and_then(Value::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infraction(value: Value) -> Infraction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flex_id_text_form() {
        let numeric: FlexId = serde_json::from_value(json!(123456789)).unwrap();
        let text: FlexId = serde_json::from_value(json!("123456789")).unwrap();
        assert_ne!(numeric, text);
        assert_eq!(numeric.as_text(), text.as_text());
    }

    #[test]
    fn test_amount_due_precedence() {
        let inf = infraction(json!({"valor": 10.0, "amount": 20.0, "amountToPay": 5.0}));
        assert_eq!(inf.amount_due(), Some(5.0));

        let inf = infraction(json!({"amount": 20.0, "total": 30.0}));
        assert_eq!(inf.amount_due(), Some(20.0));

        let inf = infraction(json!({"monto": "1500", "total": 30.0}));
        assert_eq!(inf.amount_due(), Some(1500.0));

        let inf = infraction(json!({"total": 30.0}));
        assert_eq!(inf.amount_due(), Some(30.0));

        assert_eq!(infraction(json!({})).amount_due(), None);
    }

    #[test]
    fn test_text_aliases_skip_empty_values() {
        let inf = infraction(json!({
            "typeInfractionName": "",
            "tipo": "Parqueo",
            "observations": "",
            "descripcion": "Zona prohibida",
            "dueDate": "2025-02-01",
            "fecha_max": "2025-03-01",
            "dateInfraction": "2025-01-15"
        }));
        assert_eq!(inf.type_label(), Some("Parqueo"));
        assert_eq!(inf.description_text(), Some("Zona prohibida"));
        assert_eq!(inf.due_date_text(), Some("2025-02-01"));
        assert_eq!(inf.infraction_date(), Some("2025-01-15"));
    }

    #[test]
    fn test_listing_amount_reads_value_first() {
        assert_eq!(infraction(json!({"value": 1000, "amount": 5.0})).listing_amount(), 1000.0);
        assert_eq!(infraction(json!({"amount": 2000.0})).listing_amount(), 2000.0);
        assert_eq!(infraction(json!({"value": "abc", "amount": 5.0})).listing_amount(), 0.0);
        assert_eq!(infraction(json!({})).listing_amount(), 0.0);
    }

    #[test]
    fn test_reference_number_falls_back_to_id() {
        assert_eq!(
            infraction(json!({"number": "C-77", "id": 3})).reference_number(),
            Some("C-77".to_string())
        );
        assert_eq!(infraction(json!({"id": 3})).reference_number(), Some("3".to_string()));
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "userName": "Ana Gomez",
            "address": "Calle 1"
        }))
        .unwrap();
        assert_eq!(user.extra.get("address"), Some(&json!("Calle 1")));
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["address"], json!("Calle 1"));
    }

    #[test]
    fn test_user_display_name() {
        let user: User =
            serde_json::from_value(json!({"id": 1, "firstName": "Ana", "lastName": "Gomez"}))
                .unwrap();
        assert_eq!(user.display_name(), "Ana Gomez");
        let user: User = serde_json::from_value(json!({"id": 1, "firstName": "Ana"})).unwrap();
        assert_eq!(user.display_name(), "Ana");
    }

    #[test]
    fn test_payment_status_requires_nullable_fields() {
        let complete = json!({
            "id": 4,
            "amount": 100.0,
            "status": "Approved",
            "statusDescription": "ok",
            "paidAt": null,
            "mercadoPagoPaymentId": null,
            "paymentMethod": null,
            "infraction": {"id": 1, "stateInfraction": "Paid", "description": "x"}
        });
        let status: PaymentStatus = serde_json::from_value(complete.clone()).unwrap();
        assert_eq!(status.status, PaymentStatusKind::Approved);
        assert!(status.status.is_final());

        let mut missing = complete;
        missing.as_object_mut().unwrap().remove("paidAt");
        assert!(serde_json::from_value::<PaymentStatus>(missing).is_err());
    }

    #[test]
    fn test_agreement_aliases() {
        let agreement: PaymentAgreement = serde_json::from_value(json!({
            "id": "A-1",
            "document": 123,
            "phone": "3001234567",
            "amount": 50000.0,
            "startDate": "2025-01-01",
            "method": "Efectivo"
        }))
        .unwrap();
        assert_eq!(agreement.document_text(), "123");
        assert_eq!(agreement.contact_phone(), Some("3001234567"));
        assert_eq!(agreement.quota_amount(), Some(50000.0));
        assert_eq!(agreement.start(), Some("2025-01-01"));
        assert_eq!(agreement.method_label(), Some("Efectivo"));
    }

    #[test]
    fn test_agreement_display_fields_accept_any_type() {
        let agreement: PaymentAgreement = serde_json::from_value(json!({
            "id": 5,
            "typeFine": 3,
            "infringement": "C29",
            "installments": "12",
            "outstandingAmount": "150000",
            "isPaid": 0,
            "isCoactive": "true"
        }))
        .unwrap();
        assert_eq!(agreement.fine_type().as_deref(), Some("3"));
        assert_eq!(agreement.infringement_text().as_deref(), Some("C29"));
        assert_eq!(agreement.outstanding(), Some(150000.0));
        assert_eq!(agreement.paid(), Some(false));
        assert_eq!(agreement.coactive(), Some(true));
        assert_eq!(agreement.end(), None);
    }

    #[test]
    fn test_checkout_url_selection() {
        let pref: PaymentPreference = serde_json::from_value(json!({
            "preferenceId": "p",
            "initPoint": "https://pay.example/live",
            "sandboxInitPoint": "https://pay.example/sandbox",
            "amount": 10.0,
            "paymentId": 9
        }))
        .unwrap();
        assert_eq!(pref.checkout_url(false), "https://pay.example/live");
        assert_eq!(pref.checkout_url(true), "https://pay.example/sandbox");
    }
}
