diesel::table! {
    products (id) {
        id -> Int4,
        name -> Text,
        category -> Text,
        quantity -> Int4,
        price -> Numeric,
        description -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
