// Diesel schema compartido por SQLite y Postgres.
// Tablas: equipment, maintenance_plans, maintenance_requests
// Ids y fechas se guardan como texto (Uuid y YYYY-MM-DD). Las fechas se
// comparan como texto: sólo vale para años 0000..=9999.
use diesel::allow_tables_to_appear_in_same_query;
diesel::table! {
    equipment (id) {
        id -> Text,
        name -> Text,
        active -> Bool,
    }
}
diesel::table! {
    maintenance_plans (id) {
        id -> Text,
        name -> Nullable<Text>,
        equipment_id -> Text,
        kind -> Nullable<Text>,
        start_maintenance_date -> Nullable<Text>,
        recurrence_quantity -> BigInt,
        recurrence_unit -> Text,
        maintenance_plan_horizon -> Integer,
        note -> Nullable<Text>,
        duration_hours -> Nullable<Double>,
        next_maintenance_date -> Nullable<Text>,
        created_at_ts -> BigInt,
    }
}
diesel::table! {
    maintenance_requests (id) {
        id -> Text,
        plan_id -> Text,
        equipment_id -> Text,
        name -> Text,
        kind -> Nullable<Text>,
        schedule_date -> Text,
        request_date -> Text,
        stage -> Text,
        maintenance_type -> Text,
        note -> Nullable<Text>,
        duration_hours -> Nullable<Double>,
    }
}
allow_tables_to_appear_in_same_query!(equipment, maintenance_plans, maintenance_requests);
