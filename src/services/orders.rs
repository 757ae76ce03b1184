//! Orders service
//!
//! Create/update runs the auto-filler first, then the domain validators,
//! then persists through the transactional repository checks (overlap and
//! encompassing slot). Saves notify the professional and enqueue a
//! regeneration so availability reflects the booking.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    clock::SharedClock,
    config::BookingConfig,
    error::{AppError, AppResult, OrderErrorKind},
    models::{
        enums::{OrderStatus, ServiceType},
        order::{CreateOrder, NewOrder, Order, UpdateOrder},
        professional::Professional,
        service::{Price, Service, ServiceLocation},
        user::{User, UserLocation},
    },
    repository::Repository,
};

use super::{notifier::Notifier, regeneration::RegenerationQueue};

const ORDER_SAVED_TEMPLATE: &str =
    "Order {id} for {first_name} {last_name}: {start} - {end} ({status})";

#[derive(Clone)]
pub struct OrdersService {
    repository: Repository,
    booking: BookingConfig,
    clock: SharedClock,
    notifier: Arc<dyn Notifier>,
    queue: RegenerationQueue,
}

impl OrdersService {
    pub fn new(
        repository: Repository,
        booking: BookingConfig,
        clock: SharedClock,
        notifier: Arc<dyn Notifier>,
        queue: RegenerationQueue,
    ) -> Self {
        Self {
            repository,
            booking,
            clock,
            notifier,
            queue,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<Order> {
        self.repository.orders.get_by_id(id).await
    }

    /// Create an order.
    pub async fn create(&self, data: CreateOrder) -> AppResult<Order> {
        let service = self.repository.services.get_by_id(data.service_id).await?;
        let client = self.repository.users.get_by_id(data.client_id).await?;
        let professional = self
            .repository
            .professionals
            .get_by_id(service.professional_id)
            .await?;
        let price = self.repository.services.get_price(service.id).await?;

        let draft = fill_new(&data, &service, &client, price.as_ref());
        self.validate_reminder(&draft)?;
        let (client_location, service_location) = self.load_locations(&draft).await?;
        validate_order(
            &draft,
            &service,
            &professional,
            &client,
            client_location.as_ref(),
            service_location.as_ref(),
            self.clock.now_utc(),
            true,
        )?;

        let order = self.repository.orders.create_checked(&draft, &service).await?;
        self.notify_saved(&order, &professional).await;
        self.queue.enqueue_for_order(&order);
        Ok(order)
    }

    /// Update an order. Forbidden once the saved order has started.
    pub async fn update(&self, id: i32, data: UpdateOrder) -> AppResult<Order> {
        let saved = self.repository.orders.get_by_id(id).await?;
        if saved.start_datetime <= self.clock.now_utc() {
            return Err(AppError::BadRequest(
                "Updating a started order is forbiden.".to_string(),
            ));
        }

        let service = self.repository.services.get_by_id(saved.service_id).await?;
        let client = self.repository.users.get_by_id(saved.client_id).await?;
        let professional = self
            .repository
            .professionals
            .get_by_id(service.professional_id)
            .await?;
        let price = self.repository.services.get_price(service.id).await?;

        let draft = merge_update(&saved, &data, &service, &client, price.as_ref());
        self.validate_reminder(&draft)?;
        let (client_location, service_location) = self.load_locations(&draft).await?;
        validate_order(
            &draft,
            &service,
            &professional,
            &client,
            client_location.as_ref(),
            service_location.as_ref(),
            self.clock.now_utc(),
            false,
        )?;

        let order = self
            .repository
            .orders
            .update_checked(id, &draft, &service)
            .await?;
        self.notify_saved(&order, &professional).await;
        self.queue.enqueue_for_order(&order);
        Ok(order)
    }

    /// Delete an order and regenerate the affected availability.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let order = self.repository.orders.delete(id).await?;
        self.queue.enqueue_for_order(&order);
        Ok(())
    }

    /// Reminders step on the booking interval grid.
    fn validate_reminder(&self, draft: &NewOrder) -> AppResult<()> {
        if let Some(remind_before) = draft.remind_before {
            if remind_before < 0 || remind_before as u32 % self.booking.interval != 0 {
                return Err(AppError::Validation(format!(
                    "The reminder must be a multiple of {} minutes",
                    self.booking.interval
                )));
            }
        }
        Ok(())
    }

    async fn load_locations(
        &self,
        draft: &NewOrder,
    ) -> AppResult<(Option<UserLocation>, Option<ServiceLocation>)> {
        let client_location = match draft.client_location_id {
            Some(id) => Some(self.repository.users.get_location(id).await?),
            None => None,
        };
        let service_location = match draft.service_location_id {
            Some(id) => Some(self.repository.services.get_location(id).await?),
            None => None,
        };
        Ok((client_location, service_location))
    }

    /// Notifier failures are logged and never block the write path.
    async fn notify_saved(&self, order: &Order, professional: &Professional) {
        let recipient = match self.repository.users.get_by_id(professional.user_id).await {
            Ok(user) => user.email,
            Err(error) => {
                tracing::warn!("Notifier skipped for order {}: {}", order.id, error);
                return;
            }
        };
        let context = json!({
            "id": order.id,
            "first_name": order.first_name,
            "last_name": order.last_name,
            "start": order.start_datetime.to_rfc3339(),
            "end": order.end_datetime.to_rfc3339(),
            "status": order.status.to_string(),
        });
        let subject = format!("Order {} {}", order.id, order.status);
        if let Err(error) = self
            .notifier
            .notify(&subject, ORDER_SAVED_TEMPLATE, &context, &recipient)
            .await
        {
            tracing::warn!("Notifier failure for order {}: {}", order.id, error);
        }
    }
}

// ---------------------------------------------------------------------------
// Auto-filler
// ---------------------------------------------------------------------------

/// Fill a new order: service-policy initial status, end time, contacts
/// copied from the client, and the price from the pricing policy.
pub(crate) fn fill_new(
    data: &CreateOrder,
    service: &Service,
    client: &User,
    price: Option<&Price>,
) -> NewOrder {
    let status = data.status.unwrap_or(if service.is_auto_order_confirmation {
        OrderStatus::Confirmed
    } else {
        OrderStatus::NotConfirmed
    });
    let start_datetime = data.start_datetime;
    let end_datetime = data
        .end_datetime
        .unwrap_or(start_datetime + Duration::minutes(service.duration as i64));

    let (first_name, last_name, phone) = fill_contacts(
        data.is_for_another_person,
        data.first_name.clone(),
        data.last_name.clone(),
        data.phone.clone(),
        client,
    );

    let (filled_price, filled_currency) = match data.price {
        Some(value) => (Some(value), data.price_currency.clone()),
        None => calc_price(start_datetime, end_datetime, service, price),
    };

    NewOrder {
        service_id: service.id,
        client_id: client.id,
        status,
        start_datetime,
        end_datetime,
        service_location_id: data.service_location_id,
        client_location_id: data.client_location_id,
        note: data.note.clone(),
        price: filled_price,
        price_currency: filled_currency,
        remind_before: data.remind_before,
        is_for_another_person: data.is_for_another_person,
        first_name,
        last_name,
        phone,
    }
}

/// Overlay an update on the saved order and re-run the fillers that apply
/// to existing records (contacts and price; the initial status policy does
/// not).
pub(crate) fn merge_update(
    saved: &Order,
    data: &UpdateOrder,
    service: &Service,
    client: &User,
    price: Option<&Price>,
) -> NewOrder {
    let start_datetime = data.start_datetime.unwrap_or(saved.start_datetime);
    let end_datetime = data.end_datetime.unwrap_or(saved.end_datetime);
    let is_for_another_person = data
        .is_for_another_person
        .unwrap_or(saved.is_for_another_person);

    let (first_name, last_name, phone) = fill_contacts(
        is_for_another_person,
        data.first_name.clone().or_else(|| non_empty(&saved.first_name)),
        data.last_name.clone().or_else(|| non_empty(&saved.last_name)),
        data.phone.clone().or_else(|| saved.phone.clone()),
        client,
    );

    let (filled_price, filled_currency) = match data.price.or(saved.price) {
        Some(value) => (
            Some(value),
            data.price_currency
                .clone()
                .or_else(|| saved.price_currency.clone()),
        ),
        None => calc_price(start_datetime, end_datetime, service, price),
    };

    NewOrder {
        service_id: saved.service_id,
        client_id: saved.client_id,
        status: data.status.unwrap_or(saved.status),
        start_datetime,
        end_datetime,
        service_location_id: data.service_location_id.or(saved.service_location_id),
        client_location_id: data.client_location_id.or(saved.client_location_id),
        note: data.note.clone().or_else(|| saved.note.clone()),
        price: filled_price,
        price_currency: filled_currency,
        remind_before: data.remind_before.or(saved.remind_before),
        is_for_another_person,
        first_name,
        last_name,
        phone,
    }
}

fn fill_contacts(
    is_for_another_person: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    client: &User,
) -> (String, String, Option<String>) {
    if is_for_another_person {
        return (
            first_name.unwrap_or_default(),
            last_name.unwrap_or_default(),
            phone,
        );
    }
    (
        first_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| client.first_name.clone()),
        last_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| client.last_name.clone()),
        phone.filter(|s| !s.is_empty()).or_else(|| client.phone.clone()),
    )
}

/// Pricing policy: a fixed service price scales with the number of service
/// durations the order spans; range prices fill nothing.
fn calc_price(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    service: &Service,
    price: Option<&Price>,
) -> (Option<Decimal>, Option<String>) {
    let Some(price) = price else {
        return (None, None);
    };
    if !price.is_price_fixed {
        return (None, None);
    }
    let Some(amount) = price.price else {
        return (None, None);
    };
    if service.duration <= 0 {
        return (None, None);
    }
    let minutes = (end - start).num_minutes();
    let multiple = Decimal::from(minutes) / Decimal::from(service.duration);
    (Some(amount * multiple), Some(price.currency.clone()))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Run the storage-free validators. Overlap and encompassing-slot checks run
/// later, inside the persisting transaction.
#[allow(clippy::too_many_arguments)]
pub(crate) fn validate_order(
    draft: &NewOrder,
    service: &Service,
    professional: &Professional,
    client: &User,
    client_location: Option<&UserLocation>,
    service_location: Option<&ServiceLocation>,
    now: DateTime<Utc>,
    is_new: bool,
) -> AppResult<()> {
    validate_dates(draft, service, now, is_new)?;
    validate_status(draft, now)?;
    validate_client(draft, professional, client)?;
    validate_client_location(draft, service, client, client_location)?;
    validate_service_location(draft, service, service_location)?;
    Ok(())
}

fn validate_dates(
    draft: &NewOrder,
    service: &Service,
    now: DateTime<Utc>,
    is_new: bool,
) -> AppResult<()> {
    if is_new && (draft.start_datetime <= now || draft.end_datetime <= now) {
        return Err(AppError::order(
            OrderErrorKind::DatesInvalid,
            "The datetime must be in the future",
        ));
    }
    if draft.start_datetime >= draft.end_datetime {
        return Err(AppError::order(
            OrderErrorKind::DatesInvalid,
            "The dates is incorrect",
        ));
    }
    let minutes = draft.duration_minutes();
    if service.duration <= 0 || minutes <= 0 || minutes % service.duration as i64 != 0 {
        return Err(AppError::order(
            OrderErrorKind::DurationNotMultiple,
            "The duration must be a multiple of the service duration",
        ));
    }
    Ok(())
}

fn validate_status(draft: &NewOrder, now: DateTime<Utc>) -> AppResult<()> {
    if draft.status == OrderStatus::Canceled && draft.start_datetime <= now {
        return Err(AppError::order(
            OrderErrorKind::StatusInvalid,
            "Orders in the past cannot be canceled",
        ));
    }
    Ok(())
}

fn validate_client(draft: &NewOrder, professional: &Professional, client: &User) -> AppResult<()> {
    if client.id == professional.user_id {
        return Err(AppError::order(
            OrderErrorKind::ClientInvalid,
            "The client and the professional are identical.",
        ));
    }
    if draft.first_name.is_empty() || draft.last_name.is_empty() {
        return Err(AppError::order(
            OrderErrorKind::ClientInvalid,
            "The name is empty",
        ));
    }
    if draft.phone.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::order(
            OrderErrorKind::ClientInvalid,
            "The phone is empty",
        ));
    }
    Ok(())
}

fn validate_client_location(
    draft: &NewOrder,
    service: &Service,
    client: &User,
    location: Option<&UserLocation>,
) -> AppResult<()> {
    if service.service_type != ServiceType::ClientLocation {
        if draft.client_location_id.is_some() {
            return Err(AppError::order(
                OrderErrorKind::ClientLocationInvalid,
                "The client location is not expected",
            ));
        }
        return Ok(());
    }
    let Some(location) = location else {
        return Err(AppError::order(
            OrderErrorKind::ClientLocationInvalid,
            "The client location is empty",
        ));
    };
    if location.user_id != client.id {
        return Err(AppError::order(
            OrderErrorKind::ClientLocationInvalid,
            "The client location from the other user",
        ));
    }
    Ok(())
}

fn validate_service_location(
    draft: &NewOrder,
    service: &Service,
    location: Option<&ServiceLocation>,
) -> AppResult<()> {
    if service.service_type != ServiceType::ProfessionalLocation {
        if draft.service_location_id.is_some() {
            return Err(AppError::order(
                OrderErrorKind::ServiceLocationInvalid,
                "The service location is not expected",
            ));
        }
        return Ok(());
    }
    let Some(location) = location else {
        return Err(AppError::order(
            OrderErrorKind::ServiceLocationInvalid,
            "The service location is empty",
        ));
    };
    if location.service_id != service.id {
        return Err(AppError::order(
            OrderErrorKind::ServiceLocationInvalid,
            "The service location from the other service",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn service(service_type: ServiceType, auto_confirm: bool) -> Service {
        Service {
            id: 3,
            professional_id: 7,
            name: "Haircut".to_string(),
            description: None,
            duration: 60,
            service_type,
            is_base_schedule: false,
            is_auto_order_confirmation: auto_confirm,
            is_enabled: true,
            crea_date: None,
            modif_date: None,
        }
    }

    fn professional() -> Professional {
        Professional {
            id: 7,
            user_id: 70,
            name: "Sam the barber".to_string(),
            crea_date: None,
            modif_date: None,
        }
    }

    fn client() -> User {
        User {
            id: 40,
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Moreau".to_string(),
            phone: Some("+33612345678".to_string()),
            crea_date: None,
        }
    }

    fn fixed_price(amount: i64) -> Price {
        Price {
            id: 1,
            service_id: 3,
            is_price_fixed: true,
            price: Some(Decimal::from(amount)),
            start_price: None,
            end_price: None,
            currency: "EUR".to_string(),
        }
    }

    fn create_order(start: DateTime<Utc>) -> CreateOrder {
        CreateOrder {
            service_id: 3,
            client_id: 40,
            start_datetime: start,
            end_datetime: None,
            status: None,
            service_location_id: None,
            client_location_id: None,
            note: None,
            price: None,
            price_currency: None,
            remind_before: None,
            is_for_another_person: false,
            first_name: None,
            last_name: None,
            phone: None,
        }
    }

    fn future_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_fill_applies_auto_confirmation_policy() {
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &client(),
            None,
        );
        assert_eq!(draft.status, OrderStatus::Confirmed);

        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, false),
            &client(),
            None,
        );
        assert_eq!(draft.status, OrderStatus::NotConfirmed);
    }

    #[test]
    fn test_fill_keeps_explicit_status() {
        let mut data = create_order(future_start());
        data.status = Some(OrderStatus::Paid);
        let draft = fill_new(&data, &service(ServiceType::Online, true), &client(), None);
        assert_eq!(draft.status, OrderStatus::Paid);
    }

    #[test]
    fn test_fill_sets_end_from_service_duration() {
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &client(),
            None,
        );
        assert_eq!(draft.end_datetime, future_start() + Duration::minutes(60));
    }

    #[test]
    fn test_fill_copies_client_contacts() {
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &client(),
            None,
        );
        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.last_name, "Moreau");
        assert_eq!(draft.phone.as_deref(), Some("+33612345678"));
    }

    #[test]
    fn test_fill_skips_contacts_for_another_person() {
        let mut data = create_order(future_start());
        data.is_for_another_person = true;
        data.first_name = Some("Bob".to_string());
        let draft = fill_new(&data, &service(ServiceType::Online, true), &client(), None);
        assert_eq!(draft.first_name, "Bob");
        assert_eq!(draft.last_name, "");
        assert_eq!(draft.phone, None);
    }

    #[test]
    fn test_fill_computes_fixed_price_with_multiple() {
        let mut data = create_order(future_start());
        data.end_datetime = Some(future_start() + Duration::minutes(120));
        let draft = fill_new(
            &data,
            &service(ServiceType::Online, true),
            &client(),
            Some(&fixed_price(30)),
        );
        assert_eq!(draft.price, Some(Decimal::from(60)));
        assert_eq!(draft.price_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_fill_leaves_range_price_empty() {
        let mut price = fixed_price(30);
        price.is_price_fixed = false;
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &client(),
            Some(&price),
        );
        assert_eq!(draft.price, None);
    }

    fn valid_draft() -> NewOrder {
        fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &client(),
            None,
        )
    }

    fn kind_of(result: AppResult<()>) -> OrderErrorKind {
        match result.unwrap_err() {
            AppError::OrderValidation { kind, .. } => kind,
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_valid_order() {
        assert!(validate_order(
            &valid_draft(),
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        )
        .is_ok());
    }

    #[test]
    fn test_validate_rejects_past_start_for_new() {
        let mut draft = valid_draft();
        draft.start_datetime = now() - Duration::hours(2);
        draft.end_datetime = now() - Duration::hours(1);
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::DatesInvalid);
    }

    #[test]
    fn test_validate_allows_past_dates_on_update() {
        let mut draft = valid_draft();
        draft.start_datetime = now() - Duration::hours(2);
        draft.end_datetime = now() - Duration::hours(1);
        assert!(validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            false,
        )
        .is_ok());
    }

    #[test]
    fn test_validate_rejects_non_multiple_duration() {
        let mut draft = valid_draft();
        draft.end_datetime = draft.start_datetime + Duration::minutes(90);
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::DurationNotMultiple);
    }

    #[test]
    fn test_validate_accepts_double_duration() {
        let mut draft = valid_draft();
        draft.end_datetime = draft.start_datetime + Duration::minutes(120);
        assert!(validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        )
        .is_ok());
    }

    #[test]
    fn test_validate_rejects_cancel_of_started_order() {
        let mut draft = valid_draft();
        draft.status = OrderStatus::Canceled;
        draft.start_datetime = now() - Duration::hours(1);
        draft.end_datetime = now() + Duration::hours(1);
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            false,
        );
        assert_eq!(kind_of(result), OrderErrorKind::StatusInvalid);
    }

    #[test]
    fn test_validate_allows_cancel_of_future_order() {
        let mut draft = valid_draft();
        draft.status = OrderStatus::Canceled;
        assert!(validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            false,
        )
        .is_ok());
    }

    #[test]
    fn test_validate_rejects_client_equal_to_professional() {
        let mut own_client = client();
        own_client.id = 70; // the professional's own user account
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::Online, true),
            &own_client,
            None,
        );
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &own_client,
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ClientInvalid);
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut draft = valid_draft();
        draft.first_name = String::new();
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ClientInvalid);
    }

    #[test]
    fn test_client_location_required_for_client_location_service() {
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::ClientLocation, true),
            &client(),
            None,
        );
        let result = validate_order(
            &draft,
            &service(ServiceType::ClientLocation, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ClientLocationInvalid);
    }

    #[test]
    fn test_client_location_must_belong_to_client() {
        let mut data = create_order(future_start());
        data.client_location_id = Some(5);
        let draft = fill_new(
            &data,
            &service(ServiceType::ClientLocation, true),
            &client(),
            None,
        );
        let foreign = UserLocation {
            id: 5,
            user_id: 99,
            address: "1 rue de la Paix".to_string(),
            crea_date: None,
        };
        let result = validate_order(
            &draft,
            &service(ServiceType::ClientLocation, true),
            &professional(),
            &client(),
            Some(&foreign),
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ClientLocationInvalid);
    }

    #[test]
    fn test_client_location_accepted_when_owned() {
        let mut data = create_order(future_start());
        data.client_location_id = Some(5);
        let draft = fill_new(
            &data,
            &service(ServiceType::ClientLocation, true),
            &client(),
            None,
        );
        let owned = UserLocation {
            id: 5,
            user_id: 40,
            address: "1 rue de la Paix".to_string(),
            crea_date: None,
        };
        assert!(validate_order(
            &draft,
            &service(ServiceType::ClientLocation, true),
            &professional(),
            &client(),
            Some(&owned),
            None,
            now(),
            true,
        )
        .is_ok());
    }

    #[test]
    fn test_service_location_required_for_professional_location_service() {
        let draft = fill_new(
            &create_order(future_start()),
            &service(ServiceType::ProfessionalLocation, true),
            &client(),
            None,
        );
        let result = validate_order(
            &draft,
            &service(ServiceType::ProfessionalLocation, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ServiceLocationInvalid);
    }

    #[test]
    fn test_service_location_must_belong_to_service() {
        let mut data = create_order(future_start());
        data.service_location_id = Some(8);
        let draft = fill_new(
            &data,
            &service(ServiceType::ProfessionalLocation, true),
            &client(),
            None,
        );
        let foreign = ServiceLocation {
            id: 8,
            service_id: 99,
            address: "2 avenue Foch".to_string(),
            crea_date: None,
        };
        let result = validate_order(
            &draft,
            &service(ServiceType::ProfessionalLocation, true),
            &professional(),
            &client(),
            None,
            Some(&foreign),
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ServiceLocationInvalid);
    }

    #[test]
    fn test_unexpected_locations_rejected() {
        let mut data = create_order(future_start());
        data.client_location_id = Some(5);
        let draft = fill_new(&data, &service(ServiceType::Online, true), &client(), None);
        let result = validate_order(
            &draft,
            &service(ServiceType::Online, true),
            &professional(),
            &client(),
            None,
            None,
            now(),
            true,
        );
        assert_eq!(kind_of(result), OrderErrorKind::ClientLocationInvalid);
    }

    #[test]
    fn test_merge_update_keeps_saved_fields() {
        let saved = Order {
            id: 12,
            service_id: 3,
            client_id: 40,
            status: OrderStatus::Confirmed,
            start_datetime: future_start(),
            end_datetime: future_start() + Duration::minutes(60),
            service_location_id: None,
            client_location_id: None,
            note: Some("first visit".to_string()),
            price: Some(Decimal::from(30)),
            price_currency: Some("EUR".to_string()),
            remind_before: Some(15),
            is_for_another_person: false,
            first_name: "Alice".to_string(),
            last_name: "Moreau".to_string(),
            phone: Some("+33612345678".to_string()),
            crea_date: None,
            modif_date: None,
        };
        let update = UpdateOrder {
            start_datetime: Some(future_start() + Duration::hours(1)),
            end_datetime: Some(future_start() + Duration::hours(2)),
            ..Default::default()
        };
        let draft = merge_update(
            &saved,
            &update,
            &service(ServiceType::Online, true),
            &client(),
            None,
        );
        assert_eq!(draft.status, OrderStatus::Confirmed);
        assert_eq!(draft.start_datetime, future_start() + Duration::hours(1));
        assert_eq!(draft.note.as_deref(), Some("first visit"));
        assert_eq!(draft.price, Some(Decimal::from(30)));
        assert_eq!(draft.first_name, "Alice");
    }
}
