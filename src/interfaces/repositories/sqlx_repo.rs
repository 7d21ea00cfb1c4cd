use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxPhotoRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxCategoryRepo {
    pub pool: PgPool,
}
