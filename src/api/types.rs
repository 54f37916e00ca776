//! Wire types for the QuackWallet API.
//!
//! Field names follow the backend's schema exactly (a mix of Spanish
//! lowercase and `Pascal_Snake` columns), mapped to Rust naming via serde
//! renames. Records carry a flattened `extra` map so fields this client
//! does not know about survive a store/restore round trip.
//!
//! Form types (`RegisterForm`, `CardForm`) also own the client-side
//! validation rules, so a rejected form never reaches the network.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ── Identity records ─────────────────────────────────────────────

/// A user identity record as returned by login and profile reads.
///
/// Login responses carry `id`/`nombre`/`correo`; the profile endpoint
/// returns the fuller `Pascal_Snake` variant. Both deserialize into this
/// one type; absent fields stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Server-assigned user id.
    pub id: String,
    /// Display name (login variant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    /// Email (login variant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    /// Display name (profile variant).
    #[serde(rename = "Nombre_Usuario", default, skip_serializing_if = "Option::is_none")]
    pub nombre_usuario: Option<String>,
    /// Email (profile variant).
    #[serde(rename = "Correo", default, skip_serializing_if = "Option::is_none")]
    pub correo_perfil: Option<String>,
    /// Phone number.
    #[serde(rename = "Telefono", default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    /// Profile image reference (URL or storage key).
    #[serde(rename = "Imagen_Perfil", default, skip_serializing_if = "Option::is_none")]
    pub imagen_perfil: Option<String>,
    /// Registration timestamp, as the server formats it.
    #[serde(rename = "Fecha_Registro", default, skip_serializing_if = "Option::is_none")]
    pub fecha_registro: Option<String>,
    /// Account status.
    #[serde(rename = "Estado", default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    /// Any server fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Minimal record, as login responses produce.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nombre: None,
            correo: None,
            nombre_usuario: None,
            correo_perfil: None,
            telefono: None,
            imagen_perfil: None,
            fecha_registro: None,
            estado: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge: fields present in `patch` overwrite, absent fields
    /// are preserved. Unknown fields merge key-by-key into `extra`.
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(v) = patch.nombre {
            self.nombre = Some(v);
        }
        if let Some(v) = patch.correo {
            self.correo = Some(v);
        }
        if let Some(v) = patch.nombre_usuario {
            self.nombre_usuario = Some(v);
        }
        if let Some(v) = patch.correo_perfil {
            self.correo_perfil = Some(v);
        }
        if let Some(v) = patch.telefono {
            self.telefono = Some(v);
        }
        if let Some(v) = patch.imagen_perfil {
            self.imagen_perfil = Some(v);
        }
        if let Some(v) = patch.fecha_registro {
            self.fecha_registro = Some(v);
        }
        if let Some(v) = patch.estado {
            self.estado = Some(v);
        }
        for (key, value) in patch.extra {
            self.extra.insert(key, value);
        }
    }
}

/// Partial update for a [`UserRecord`]. All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(rename = "Nombre_Usuario", default, skip_serializing_if = "Option::is_none")]
    pub nombre_usuario: Option<String>,
    #[serde(rename = "Correo", default, skip_serializing_if = "Option::is_none")]
    pub correo_perfil: Option<String>,
    #[serde(rename = "Telefono", default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(rename = "Imagen_Perfil", default, skip_serializing_if = "Option::is_none")]
    pub imagen_perfil: Option<String>,
    #[serde(rename = "Fecha_Registro", default, skip_serializing_if = "Option::is_none")]
    pub fecha_registro: Option<String>,
    #[serde(rename = "Estado", default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Auth payloads ────────────────────────────────────────────────

/// Successful login payload: the bearer token plus the identity record.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

/// Generic server reply carrying a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: String,
}

/// Registration form as the user fills it in, confirmations included.
/// Only the validated subset is sent over the wire (see `body`).
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub nombre: String,
    pub correo: String,
    pub telefono: String,
    pub password: String,
    pub confirm_password: String,
    pub pin: String,
    pub confirm_pin: String,
}

/// Registration request body, in the backend's schema.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    #[serde(rename = "Nombre_Usuario")]
    pub nombre_usuario: &'a str,
    pub correo: &'a str,
    #[serde(rename = "Telefono")]
    pub telefono: &'a str,
    #[serde(rename = "Hash_Password")]
    pub password: &'a str,
    #[serde(rename = "Pin_Seguridad")]
    pub pin: &'a str,
}

impl RegisterForm {
    /// Validate the form locally. On failure no request may be issued.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.nombre.trim().is_empty() {
            errors.insert("nombre", "Ingresa tu nombre");
        }
        if !email_is_valid(self.correo.trim()) {
            errors.insert("correo", "Correo inválido");
        }
        if self.telefono.trim().len() < 7 {
            errors.insert("telefono", "Teléfono inválido");
        }
        if self.password.len() < 6 {
            errors.insert("password", "La contraseña debe tener al menos 6 caracteres");
        }
        if self.password != self.confirm_password {
            errors.insert("confirm_password", "Las contraseñas no coinciden");
        }
        if !pin_is_valid(&self.pin) {
            errors.insert("pin", "El PIN debe ser 4 dígitos numéricos");
        }
        if self.pin != self.confirm_pin {
            errors.insert("confirm_pin", "Los PINs no coinciden");
        }

        errors.into_result()
    }

    pub(crate) fn body(&self) -> RegisterBody<'_> {
        RegisterBody {
            nombre_usuario: &self.nombre,
            correo: &self.correo,
            telefono: &self.telefono,
            password: &self.password,
            pin: &self.pin,
        }
    }
}

// ── Profile payloads ─────────────────────────────────────────────

/// Text-field profile update (phase 1 of a profile edit; the image goes
/// through a separate multipart request).
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "Nombre_Usuario")]
    pub nombre: String,
    #[serde(rename = "Correo")]
    pub correo: String,
    #[serde(rename = "Telefono")]
    pub telefono: String,
}

// ── Card records ─────────────────────────────────────────────────

/// A payment card as returned by the cards endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    /// Server-assigned card id.
    #[serde(rename = "ID_Tarjetas")]
    pub id: i64,
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Tipo_tarjeta")]
    pub tipo_tarjeta: String,
    #[serde(rename = "Banco")]
    pub banco: String,
    /// Full card number. Kept as a string to preserve leading zeros.
    #[serde(rename = "Numero")]
    pub numero: String,
    #[serde(rename = "Saldo")]
    pub saldo: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    /// Last four characters, for masked display. Server-supplied numbers
    /// are not guaranteed to be ASCII digits (some backends return them
    /// pre-masked), so the cut respects char boundaries.
    pub fn last_four(&self) -> &str {
        match self.numero.char_indices().rev().nth(3) {
            Some((idx, _)) => &self.numero[idx..],
            None => &self.numero,
        }
    }
}

/// New-card form, validated locally before submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardForm {
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Tipo_tarjeta")]
    pub tipo_tarjeta: String,
    #[serde(rename = "Banco")]
    pub banco: String,
    #[serde(rename = "Numero")]
    pub numero: String,
    #[serde(rename = "Saldo")]
    pub saldo: f64,
}

impl CardForm {
    /// Validate the form locally. On failure no request may be issued.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.nombre.trim().is_empty() {
            errors.insert("nombre", "Ingresa el nombre de la tarjeta");
        }
        if self.tipo_tarjeta.trim().is_empty() {
            errors.insert("tipo_tarjeta", "Selecciona el tipo de tarjeta");
        }
        if self.banco.trim().is_empty() {
            errors.insert("banco", "Ingresa el nombre del banco");
        }
        if self.numero.len() != 16 || !self.numero.bytes().all(|b| b.is_ascii_digit()) {
            errors.insert("numero", "El número de tarjeta debe tener 16 dígitos");
        }
        if !self.saldo.is_finite() || self.saldo < 0.0 {
            errors.insert("saldo", "Ingresa un saldo válido");
        }

        errors.into_result()
    }
}

/// Partial card update. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardPatch {
    #[serde(rename = "Nombre", skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(rename = "Tipo_tarjeta", skip_serializing_if = "Option::is_none")]
    pub tipo_tarjeta: Option<String>,
    #[serde(rename = "Banco", skip_serializing_if = "Option::is_none")]
    pub banco: Option<String>,
    #[serde(rename = "Numero", skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(rename = "Saldo", skip_serializing_if = "Option::is_none")]
    pub saldo: Option<f64>,
}

// ── Local validation ─────────────────────────────────────────────

/// Per-field validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Minimal email shape check: one `@`, non-empty local part, dotted domain.
fn email_is_valid(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// PINs are exactly four ASCII digits.
fn pin_is_valid(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}
