pub mod image_record;
