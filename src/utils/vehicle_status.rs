//! Clasificación de estados de vehículo
//!
//! Funciones puras que traducen un `VehicleStatus` (o un string crudo leído
//! de la base de datos) a lo que ven las vistas públicas y de administración:
//! etiqueta pública, visibilidad, categoría de badge y grupo de filtro.
//!
//! Los cuatro conjuntos (arriving soon, arrived, reserved, hidden) salen de un
//! único `match` exhaustivo en `public_class`; un estado nuevo no compila
//! hasta que se clasifica.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::vehicle::VehicleStatus;

/// Clase pública de un estado. Los cuatro valores son disjuntos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicClass {
    ArrivingSoon,
    Arrived,
    Reserved,
    Hidden,
}

/// Grupo de filtro para la UI pública de tres pestañas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    #[default]
    All,
    Arrived,
    ArrivingSoon,
}

impl StatusGroup {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusGroup::All => "all",
            StatusGroup::Arrived => "arrived",
            StatusGroup::ArrivingSoon => "arriving_soon",
        }
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusGroup {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(StatusGroup::All),
            "arrived" => Ok(StatusGroup::Arrived),
            "arriving_soon" => Ok(StatusGroup::ArrivingSoon),
            other => Err(format!(
                "unknown status group '{}', expected one of: all, arrived, arriving_soon",
                other
            )),
        }
    }
}

/// Etiqueta pública de un vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicStatusLabel {
    ArrivingSoon,
    Arrived,
    Reserved,
}

impl PublicStatusLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PublicStatusLabel::ArrivingSoon => "Arriving Soon",
            PublicStatusLabel::Arrived => "Arrived",
            PublicStatusLabel::Reserved => "Reserved",
        }
    }
}

impl Serialize for PublicStatusLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Categoría de estilo del badge; `Unknown` es el fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    ArrivingSoon,
    Arrived,
    Reserved,
    Unknown,
}

impl BadgeCategory {
    /// Token de color que consume el frontend
    pub const fn color(&self) -> &'static str {
        match self {
            BadgeCategory::ArrivingSoon => "blue",
            BadgeCategory::Arrived => "green",
            BadgeCategory::Reserved => "amber",
            BadgeCategory::Unknown => "gray",
        }
    }
}

/// Fuente única de verdad de la clasificación
pub const fn public_class(status: VehicleStatus) -> PublicClass {
    match status {
        VehicleStatus::AuctionWon
        | VehicleStatus::PaymentPending
        | VehicleStatus::PaymentCompleted
        | VehicleStatus::PickupScheduled
        | VehicleStatus::PickedUp
        | VehicleStatus::AtOriginPort
        | VehicleStatus::Shipped
        | VehicleStatus::InTransit
        | VehicleStatus::AtDestinationPort
        | VehicleStatus::CustomsClearance
        | VehicleStatus::ReleasedFromCustoms => PublicClass::ArrivingSoon,
        VehicleStatus::AtYard | VehicleStatus::UnderEnhancement | VehicleStatus::ReadyForSale => {
            PublicClass::Arrived
        }
        VehicleStatus::Reserved => PublicClass::Reserved,
        VehicleStatus::Sold | VehicleStatus::Delivered => PublicClass::Hidden,
    }
}

/// Estados de una clase, en orden de ciclo de vida
pub fn statuses_in(class: PublicClass) -> impl Iterator<Item = VehicleStatus> {
    VehicleStatus::ALL
        .into_iter()
        .filter(move |status| public_class(*status) == class)
}

pub fn arriving_soon_statuses() -> Vec<VehicleStatus> {
    statuses_in(PublicClass::ArrivingSoon).collect()
}

pub fn arrived_statuses() -> Vec<VehicleStatus> {
    statuses_in(PublicClass::Arrived).collect()
}

pub fn reserved_statuses() -> Vec<VehicleStatus> {
    statuses_in(PublicClass::Reserved).collect()
}

pub fn hidden_statuses() -> Vec<VehicleStatus> {
    statuses_in(PublicClass::Hidden).collect()
}

/// Etiqueta pública; `None` para estados ocultos (sold/delivered).
/// Quien llama debe revisar también `is_publicly_visible`.
pub fn classify_for_public(status: VehicleStatus) -> Option<PublicStatusLabel> {
    match public_class(status) {
        PublicClass::ArrivingSoon => Some(PublicStatusLabel::ArrivingSoon),
        PublicClass::Arrived => Some(PublicStatusLabel::Arrived),
        PublicClass::Reserved => Some(PublicStatusLabel::Reserved),
        PublicClass::Hidden => None,
    }
}

pub fn is_publicly_visible(status: VehicleStatus) -> bool {
    public_class(status) != PublicClass::Hidden
}

/// Los estados ocultos caen en `Unknown`: se filtran antes de llegar aquí.
pub fn badge_category(status: VehicleStatus) -> BadgeCategory {
    match public_class(status) {
        PublicClass::ArrivingSoon => BadgeCategory::ArrivingSoon,
        PublicClass::Arrived => BadgeCategory::Arrived,
        PublicClass::Reserved => BadgeCategory::Reserved,
        PublicClass::Hidden => BadgeCategory::Unknown,
    }
}

/// Grupo de la UI pública. `Reserved` y los ocultos caen en `All`
/// (no existe pestaña de reservados).
pub fn group_of(status: VehicleStatus) -> StatusGroup {
    match public_class(status) {
        PublicClass::Arrived => StatusGroup::Arrived,
        PublicClass::ArrivingSoon => StatusGroup::ArrivingSoon,
        PublicClass::Reserved | PublicClass::Hidden => StatusGroup::All,
    }
}

/// Búsqueda inversa. `All` = arriving soon ∪ arrived ∪ reserved, sin ocultos.
pub fn statuses_for_group(group: StatusGroup) -> Vec<VehicleStatus> {
    match group {
        StatusGroup::Arrived => arrived_statuses(),
        StatusGroup::ArrivingSoon => arriving_soon_statuses(),
        StatusGroup::All => statuses_in(PublicClass::ArrivingSoon)
            .chain(statuses_in(PublicClass::Arrived))
            .chain(statuses_in(PublicClass::Reserved))
            .collect(),
    }
}

/// Valores wire de `statuses_for_group`, listos para un `= ANY($n)`
pub fn status_values_for_group(group: StatusGroup) -> Vec<String> {
    statuses_for_group(group)
        .into_iter()
        .map(|status| status.as_str().to_string())
        .collect()
}

/// Valores wire de los estados ocultos
pub fn hidden_status_values() -> Vec<String> {
    statuses_in(PublicClass::Hidden)
        .map(|status| status.as_str().to_string())
        .collect()
}

/// Resultado completo de clasificar un estado, listo para serializar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusClassification {
    pub status: String,
    /// Etiqueta de administración; `None` si el valor no está en la taxonomía
    pub status_label: Option<&'static str>,
    pub public_label: Option<PublicStatusLabel>,
    pub is_public: bool,
    pub badge: BadgeCategory,
    pub badge_color: &'static str,
    pub group: StatusGroup,
}

impl StatusClassification {
    pub fn of(status: VehicleStatus) -> Self {
        let badge = badge_category(status);
        Self {
            status: status.as_str().to_string(),
            status_label: Some(status.label()),
            public_label: classify_for_public(status),
            is_public: is_publicly_visible(status),
            badge,
            badge_color: badge.color(),
            group: group_of(status),
        }
    }
}

/// Clasifica un string crudo sin fallar nunca.
///
/// Un valor fuera de la taxonomía (drift entre datos guardados y el enum)
/// degrada a: sin etiqueta, visible, badge `unknown`, grupo `all`.
pub fn classify_raw(raw: &str) -> StatusClassification {
    match raw.parse::<VehicleStatus>() {
        Ok(status) => StatusClassification::of(status),
        Err(_) => StatusClassification {
            status: raw.to_string(),
            status_label: None,
            public_label: None,
            is_public: true,
            badge: BadgeCategory::Unknown,
            badge_color: BadgeCategory::Unknown.color(),
            group: StatusGroup::All,
        },
    }
}

/// Catálogo completo (endpoint público de estados)
pub fn status_catalog() -> Vec<StatusClassification> {
    VehicleStatus::ALL
        .into_iter()
        .map(StatusClassification::of)
        .collect()
}
