use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_restaurants_table::Migration),
            Box::new(m20250101_000002_create_menu_items_table::Migration),
            Box::new(m20250101_000003_create_orders_table::Migration),
            Box::new(m20250101_000004_create_order_items_table::Migration),
            Box::new(m20250101_000005_create_reviews_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_restaurants_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_restaurants_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create restaurants table aligned with entities::restaurant Model
            manager
                .create_table(
                    Table::create()
                        .table(Restaurants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Restaurants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Restaurants::Name).string().not_null())
                        .col(ColumnDef::new(Restaurants::Email).string().not_null())
                        .col(
                            ColumnDef::new(Restaurants::PasswordHash)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Restaurants::Address).string().not_null())
                        .col(ColumnDef::new(Restaurants::Phone).string().not_null())
                        .col(ColumnDef::new(Restaurants::Description).string().null())
                        .col(
                            ColumnDef::new(Restaurants::OpenTime)
                                .string()
                                .not_null()
                                .default("09:00"),
                        )
                        .col(
                            ColumnDef::new(Restaurants::CloseTime)
                                .string()
                                .not_null()
                                .default("22:00"),
                        )
                        .col(
                            ColumnDef::new(Restaurants::DiscountEnabled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Restaurants::DiscountPercentage)
                                .decimal()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(Restaurants::DiscountMinOrderAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Restaurants::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Restaurants::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Registration requires a unique email per restaurant
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_restaurants_email")
                        .table(Restaurants::Table)
                        .col(Restaurants::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Restaurants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Restaurants {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Address,
        Phone,
        Description,
        OpenTime,
        CloseTime,
        DiscountEnabled,
        DiscountPercentage,
        DiscountMinOrderAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_menu_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_menu_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MenuItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MenuItems::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(MenuItems::Name).string().not_null())
                        .col(ColumnDef::new(MenuItems::Description).string().null())
                        .col(ColumnDef::new(MenuItems::Price).decimal().not_null())
                        .col(ColumnDef::new(MenuItems::Category).string().not_null())
                        .col(ColumnDef::new(MenuItems::Image).string().null())
                        .col(
                            ColumnDef::new(MenuItems::IsAvailable)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(MenuItems::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(MenuItems::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Menu listings always filter by restaurant and group by category
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_items_restaurant_category")
                        .table(MenuItems::Table)
                        .col(MenuItems::RestaurantId)
                        .col(MenuItems::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MenuItems {
        Table,
        Id,
        RestaurantId,
        Name,
        Description,
        Price,
        Category,
        Image,
        IsAvailable,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::RestaurantId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::TableNumber).string().null())
                        .col(ColumnDef::new(Orders::CustomerNote).string().null())
                        .col(
                            ColumnDef::new(Orders::DiscountApplied)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Useful indexes
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_restaurant_status")
                        .table(Orders::Table)
                        .col(Orders::RestaurantId)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_restaurant_created_at")
                        .table(Orders::Table)
                        .col(Orders::RestaurantId)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        RestaurantId,
        TotalPrice,
        Status,
        TableNumber,
        CustomerNote,
        DiscountApplied,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_order_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MenuItemId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Name).string().not_null())
                        .col(ColumnDef::new(OrderItems::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        MenuItemId,
        Name,
        Price,
        Quantity,
    }
}

mod m20250101_000005_create_reviews_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reviews::RestaurantId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::FoodRating).integer().not_null())
                        .col(
                            ColumnDef::new(Reviews::RestaurantRating)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reviews::Comment).string().null())
                        .col(
                            ColumnDef::new(Reviews::DiscountEarned)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Reviews::DiscountCode).string().null())
                        .col(
                            ColumnDef::new(Reviews::IsRedeemed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Reviews::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Reviews::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // One review per order
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_order_id")
                        .table(Reviews::Table)
                        .col(Reviews::OrderId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Discount codes are looked up at redemption and must be unique
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_discount_code")
                        .table(Reviews::Table)
                        .col(Reviews::DiscountCode)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_restaurant_created_at")
                        .table(Reviews::Table)
                        .col(Reviews::RestaurantId)
                        .col(Reviews::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Reviews {
        Table,
        Id,
        RestaurantId,
        OrderId,
        FoodRating,
        RestaurantRating,
        Comment,
        DiscountEarned,
        DiscountCode,
        IsRedeemed,
        CreatedAt,
        UpdatedAt,
    }
}
