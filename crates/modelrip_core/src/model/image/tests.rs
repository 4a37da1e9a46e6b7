mod unit_rom_image {

	use crate::model::{ByteLayout, ModelError, RomImage};

	#[test]
	fn open_reads_and_normalizes_file() {
		let path = modelrip_testkit::write_temp_image("rom_image_open", &[0x37, 0x80, 0x40, 0x12, 0x02, 0x01]);
		let image = RomImage::open(&path).expect("image opens");
		assert_eq!(image.layout, ByteLayout::ByteSwapped);
		assert_eq!(image.bytes(), &[0x80, 0x37, 0x12, 0x40, 0x01, 0x02]);
		assert_eq!(image.len(), 6);
	}

	#[test]
	fn open_missing_file_is_io_error() {
		let path = modelrip_testkit::target_dir().join("modelrip-missing").join("absent.z64");
		let err = RomImage::open(path).expect_err("missing file fails");
		assert!(matches!(err, ModelError::Io(_)));
	}

	#[test]
	fn offsets_past_end_are_fatal() {
		let image = RomImage::from_bytes(vec![0; 16]);
		assert!(image.check_offset(15).is_ok());
		let err = image.check_offset(16).expect_err("offset at length fails");
		assert!(matches!(err, ModelError::OffsetOutOfRange { offset: 16, len: 16 }));
	}

	#[test]
	fn records_must_fit_entirely() {
		let image = RomImage::from_bytes(vec![0; 0x80]);
		assert!(image.check_record(0x08, 0x78).is_ok());
		let err = image.check_record(0x10, 0x78).expect_err("record overruns image");
		assert!(matches!(err, ModelError::RecordTruncated { need: 0x78, .. }));
	}
}
