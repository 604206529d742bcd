diesel::table! {
    clima (id) {
        id -> Integer,
        ciudad -> Text,
        temperatura -> Nullable<Double>,
        humedad -> Nullable<Double>,
        velocidad_viento -> Nullable<Double>,
        sensacion_termica -> Nullable<Double>,
        fecha_extraccion -> Timestamp,
    }
}
