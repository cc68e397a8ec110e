//! services/form_events.rs
//! Eventos del formulario de Print Format, despachados por nombre de campo.

use anyhow::{anyhow, Result};
use futures::{stream, Stream, StreamExt};

use crate::{
    models::print_format_model::{fields, FieldChangeRequest, PrintFormatConfig},
    services::{
        backend_policy::{BackendChange, BackendPolicy},
        host_context::HostContext,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Load,
    FieldChanged(String),
}

impl FormEvent {
    pub fn field(name: impl Into<String>) -> Self {
        FormEvent::FieldChanged(name.into())
    }
}

/// Aplica un evento sobre el registro. Una escritura hecha por un handler
/// dispara a su vez el evento de ese campo, igual que un set_value del form.
pub fn dispatch<H: HostContext + ?Sized>(
    policy: &BackendPolicy<'_, H>,
    config: &mut PrintFormatConfig,
    event: &FormEvent,
) -> BackendChange {
    match event {
        FormEvent::Load => {
            policy.on_load(config);
            BackendChange::Unchanged
        }
        FormEvent::FieldChanged(field) => match field.as_str() {
            fields::PRINT_DESIGNER => {
                let change = policy.on_designer_toggle(config);
                if change != BackendChange::Unchanged {
                    dispatch(policy, config, &FormEvent::field(fields::PDF_GENERATOR));
                }
                change
            }
            fields::PDF_GENERATOR => {
                policy.on_backend_field_change(config);
                BackendChange::Unchanged
            }
            _ => BackendChange::Unchanged,
        },
    }
}

/// Consume una secuencia de eventos en orden, uno a la vez.
pub async fn process_events<H, S>(
    policy: &BackendPolicy<'_, H>,
    config: &mut PrintFormatConfig,
    events: S,
) -> Vec<BackendChange>
where
    H: HostContext + ?Sized,
    S: Stream<Item = FormEvent>,
{
    let mut events = Box::pin(events);
    let mut changes = Vec::new();
    while let Some(event) = events.next().await {
        changes.push(dispatch(policy, config, &event));
    }
    changes
}

/// Escribe el campo que mandó el formulario y dispara su evento.
pub fn apply_field_change<H: HostContext + ?Sized>(
    policy: &BackendPolicy<'_, H>,
    config: &mut PrintFormatConfig,
    change: FieldChangeRequest,
) -> Result<BackendChange> {
    config
        .set_field(&change.field, change.value)
        .map_err(|e| anyhow!(e))?;
    Ok(dispatch(policy, config, &FormEvent::FieldChanged(change.field)))
}

/// Guardado con varios campos: se escriben todos y luego se disparan sus
/// eventos en el orden recibido. Un valor inválido corta antes de despachar.
pub async fn apply_field_changes<H: HostContext + ?Sized>(
    policy: &BackendPolicy<'_, H>,
    config: &mut PrintFormatConfig,
    changes: Vec<FieldChangeRequest>,
) -> Result<Vec<BackendChange>> {
    let mut events = Vec::with_capacity(changes.len());
    for change in changes {
        config
            .set_field(&change.field, change.value)
            .map_err(|e| anyhow!("{}: {}", change.field, e))?;
        events.push(FormEvent::FieldChanged(change.field));
    }
    Ok(process_events(policy, config, stream::iter(events)).await)
}
