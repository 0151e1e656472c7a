use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::telemetry::RideTelemetry;

fn u64_field(name: &'static str) -> Field {
    Field::new(name, DataType::UInt64, false)
}

fn f64_field(name: &'static str) -> Field {
    Field::new(name, DataType::Float64, false)
}

pub fn write_completed_rides_parquet<P: AsRef<Path>>(
    path: P,
    telemetry: &RideTelemetry,
) -> Result<(), Box<dyn Error>> {
    let rides = &telemetry.completed_rides;
    let mut cab_ids = Vec::with_capacity(rides.len());
    let mut passenger_counts = Vec::with_capacity(rides.len());
    let mut pickups = Vec::with_capacity(rides.len());
    let mut dropoffs = Vec::with_capacity(rides.len());
    let mut route_lens = Vec::with_capacity(rides.len());
    let mut total_distances = Vec::with_capacity(rides.len());
    let mut fares = Vec::with_capacity(rides.len());
    let mut booked_at = Vec::with_capacity(rides.len());
    let mut dispatched_at = Vec::with_capacity(rides.len());
    let mut completed_at = Vec::with_capacity(rides.len());

    for ride in rides {
        cab_ids.push(ride.cab_id as u64);
        passenger_counts.push(ride.passenger_count as u64);
        pickups.push(u64::from(ride.pickup));
        dropoffs.push(u64::from(ride.dropoff));
        route_lens.push(ride.route_len as u64);
        total_distances.push(ride.total_distance);
        fares.push(ride.fare);
        booked_at.push(ride.booked_at);
        dispatched_at.push(ride.dispatched_at);
        completed_at.push(ride.completed_at);
    }

    let schema = Schema::new(vec![
        u64_field("cab_id"),
        u64_field("passenger_count"),
        u64_field("pickup"),
        u64_field("dropoff"),
        u64_field("route_len"),
        f64_field("total_distance"),
        f64_field("fare"),
        u64_field("booked_at"),
        u64_field("dispatched_at"),
        u64_field("completed_at"),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(cab_ids)),
        Arc::new(UInt64Array::from(passenger_counts)),
        Arc::new(UInt64Array::from(pickups)),
        Arc::new(UInt64Array::from(dropoffs)),
        Arc::new(UInt64Array::from(route_lens)),
        Arc::new(Float64Array::from(total_distances)),
        Arc::new(Float64Array::from(fares)),
        Arc::new(UInt64Array::from(booked_at)),
        Arc::new(UInt64Array::from(dispatched_at)),
        Arc::new(UInt64Array::from(completed_at)),
    ];

    write_record_batch(path, schema, arrays)
}

fn write_record_batch<P: AsRef<Path>>(
    path: P,
    schema: Schema,
    arrays: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
