//! Repository layer for database operations

pub mod orders;
pub mod professionals;
pub mod schedules;
pub mod services;
pub mod slots;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub professionals: professionals::ProfessionalsRepository,
    pub services: services::ServicesRepository,
    pub schedules: schedules::SchedulesRepository,
    pub slots: slots::SlotsRepository,
    pub orders: orders::OrdersRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            professionals: professionals::ProfessionalsRepository::new(pool.clone()),
            services: services::ServicesRepository::new(pool.clone()),
            schedules: schedules::SchedulesRepository::new(pool.clone()),
            slots: slots::SlotsRepository::new(pool.clone()),
            orders: orders::OrdersRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
