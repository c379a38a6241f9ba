//! Credential schema versions and their template leaf tables.
//!
//! Keys and constant values are decimal BN254 elements produced by
//! merklizing the credential JSON-LD schemas. They are fixed per schema
//! version and must match the circuit's hard-coded template.

use crate::codec::fr_from_decimal;
use crate::error::{CircuitInputError, Result};
use crate::template::TemplateLeaf;
use ark_bn254::Fr;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Merklized path keys of the BasicPerson v1.43 schema.
pub mod basic_person {
    pub const DATE_OF_BIRTH: &str =
        "4817156672888655522763064392525239094511187154831557262772815264540847425378";
    pub const DOCUMENT_EXPIRATION_DATE: &str =
        "2661316897620170050641842010022238582485958559445913964628121513401804945508";
    pub const FIRST_NAME: &str =
        "17812501853592608022106438142029031484125620705472224666715824544873239913147";
    pub const FULL_NAME: &str =
        "643493878926457766162531104335565260785288743937125657511062755781004518297";
    pub const GOVERNMENT_IDENTIFIER: &str =
        "5768075745493428917651844471684022554030750947591103713762344570867180513614";
    pub const GOVERNMENT_IDENTIFIER_TYPE: &str =
        "12037662945351652395520680282306597407040165994104304811455681806232413956620";
    pub const SEX: &str =
        "16829829523990922339853122033176330960757159233571217495904710638791793740933";
    pub const REVOCATION_NONCE: &str =
        "18652354674254268839450839640508993614932212252620036777561285260846450401086";
    pub const CREDENTIAL_STATUS_ID: &str =
        "11896622783611378286548274235251973588039499084629981048616800443645803129554";
    pub const CREDENTIAL_SUBJECT_ID: &str =
        "4792130079462681165428511201253235850015648352883240577315026477780493110675";
    pub const EXPIRATION_DATE: &str =
        "13483382060079230067188057675928039600565406666878111320562435194759310415773";
    pub const ISSUANCE_DATE: &str =
        "8713837106709436881047310678745516714551061952618778897121563913918335939585";
    pub const ISSUER: &str =
        "5940025296598751562822259677636111513267244048295724788691376971035167813215";
    pub const DOCUMENT_NATIONALITY: &str =
        "12721581730399791084220775389224758160887300573168177512619749567794685336757";
    pub const DOCUMENT_ISSUER: &str =
        "8420111610095993874869544651671831438228943062702729758375308097770323355054";
    pub const GENDER: &str =
        "5404445087797932868809306015538218496376343675339731487859545200224329791072";
    pub const ADDRESS_LINE_1: &str =
        "2789441998411353097504888849796647342929687866714787904727157138859134659534";

    /// credentialSubject.type, credentialStatus.type, credentialSchema.type,
    /// type (x2), credentialSchema.id
    pub const CONSTANTS: [(&str, &str); 6] = [
        (
            "4809579517396073186705705159186899409599314609122482090560534255195823961763",
            "3930329666255035859341917616531724337843722428795107776052883525249467734017",
        ),
        (
            "12891444986491254085560597052395677934694594587847693550621945641098238258096",
            "1173248646377539879946536107369421994820880702773342056419798525241229208349",
        ),
        (
            "1876843462791870928827702802899567513539510253808198232854545117818238902280",
            "6863952743872184967730390635778205663409140607467436963978966043239919204962",
        ),
        (
            "14122086068848155444790679436566779517121339700977110548919573157521629996400",
            "8932896889521641034417268999369968324098807262074941120983759052810017489370",
        ),
        (
            "18943208076435454904128050626016920086499867123501959273334294100443438004188",
            "3930329666255035859341917616531724337843722428795107776052883525249467734017",
        ),
        (
            "2282658739689398501857830040602888548545380116161185117921371325237897538551",
            "6785128192015566537155412245008504798482626052796872471438218406454907503679",
        ),
    ];
}

/// Keys of the first AnonAadhaar credential schema.
pub mod anon_aadhaar_legacy {
    pub const BIRTHDAY: &str =
        "13319952139078733522750695554630631933458346585087910879123048180112892347049";
    pub const GENDER: &str =
        "10164804319113601592709052825465566543798059716079261081106678069863727363127";
    pub const PINCODE: &str =
        "1044934786333234750726995748708908396493389234902509278003344567776685904786";
    pub const STATE: &str =
        "18399736510711010434057702561154623084154073746787114033062223519394499254431";

    pub const CONSTANTS: [(&str, &str); 6] = [
        (
            "4809579517396073186705705159186899409599314609122482090560534255195823961763",
            "3751782318016764902460517383636219429745087389162942693670855676890817944684",
        ),
        (
            "1876843462791870928827702802899567513539510253808198232854545117818238902280",
            "6863952743872184967730390635778205663409140607467436963978966043239919204962",
        ),
        (
            "12891444986491254085560597052395677934694594587847693550621945641098238258096",
            "1173248646377539879946536107369421994820880702773342056419798525241229208349",
        ),
        (
            "14122086068848155444790679436566779517121339700977110548919573157521629996400",
            "8932896889521641034417268999369968324098807262074941120983759052810017489370",
        ),
        (
            "18943208076435454904128050626016920086499867123501959273334294100443438004188",
            "3751782318016764902460517383636219429745087389162942693670855676890817944684",
        ),
        (
            "2282658739689398501857830040602888548545380116161185117921371325237897538551",
            "7267241749008249664184827982574396251114082060252725574405923105367928296171",
        ),
    ];
}

/// A mutable credential attribute committed in the template tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    DateOfBirth,
    DocumentExpirationDate,
    FirstName,
    FullName,
    GovernmentIdentifier,
    GovernmentIdentifierType,
    Sex,
    Gender,
    AddressLine1,
    Pincode,
    State,
    RevocationNonce,
    CredentialStatusId,
    CredentialSubjectId,
    ExpirationDate,
    IssuanceDate,
    Issuer,
    DocumentNationality,
    DocumentIssuer,
}

const ANON_AADHAAR_V1_LEAVES: [(Attribute, &str); 13] = [
    (Attribute::DateOfBirth, basic_person::DATE_OF_BIRTH),
    (Attribute::FullName, basic_person::FULL_NAME),
    (Attribute::Gender, basic_person::GENDER),
    (Attribute::GovernmentIdentifier, basic_person::GOVERNMENT_IDENTIFIER),
    (Attribute::GovernmentIdentifierType, basic_person::GOVERNMENT_IDENTIFIER_TYPE),
    (Attribute::RevocationNonce, basic_person::REVOCATION_NONCE),
    (Attribute::AddressLine1, basic_person::ADDRESS_LINE_1),
    (Attribute::CredentialStatusId, basic_person::CREDENTIAL_STATUS_ID),
    (Attribute::CredentialSubjectId, basic_person::CREDENTIAL_SUBJECT_ID),
    (Attribute::ExpirationDate, basic_person::EXPIRATION_DATE),
    (Attribute::IssuanceDate, basic_person::ISSUANCE_DATE),
    (Attribute::Issuer, basic_person::ISSUER),
    (Attribute::DocumentIssuer, basic_person::DOCUMENT_ISSUER),
];

const ANON_AADHAAR_V1_LEGACY_LEAVES: [(Attribute, &str); 10] = [
    (Attribute::DateOfBirth, anon_aadhaar_legacy::BIRTHDAY),
    (Attribute::Gender, anon_aadhaar_legacy::GENDER),
    (Attribute::Pincode, anon_aadhaar_legacy::PINCODE),
    (Attribute::State, anon_aadhaar_legacy::STATE),
    (Attribute::RevocationNonce, basic_person::REVOCATION_NONCE),
    (Attribute::CredentialStatusId, basic_person::CREDENTIAL_STATUS_ID),
    (Attribute::CredentialSubjectId, basic_person::CREDENTIAL_SUBJECT_ID),
    (Attribute::ExpirationDate, basic_person::EXPIRATION_DATE),
    (Attribute::IssuanceDate, basic_person::ISSUANCE_DATE),
    (Attribute::Issuer, basic_person::ISSUER),
];

const PASSPORT_V1_LEAVES: [(Attribute, &str); 15] = [
    (Attribute::DateOfBirth, basic_person::DATE_OF_BIRTH),
    (Attribute::DocumentExpirationDate, basic_person::DOCUMENT_EXPIRATION_DATE),
    (Attribute::FirstName, basic_person::FIRST_NAME),
    (Attribute::FullName, basic_person::FULL_NAME),
    (Attribute::GovernmentIdentifier, basic_person::GOVERNMENT_IDENTIFIER),
    (Attribute::GovernmentIdentifierType, basic_person::GOVERNMENT_IDENTIFIER_TYPE),
    (Attribute::Sex, basic_person::SEX),
    (Attribute::RevocationNonce, basic_person::REVOCATION_NONCE),
    (Attribute::CredentialStatusId, basic_person::CREDENTIAL_STATUS_ID),
    (Attribute::CredentialSubjectId, basic_person::CREDENTIAL_SUBJECT_ID),
    (Attribute::ExpirationDate, basic_person::EXPIRATION_DATE),
    (Attribute::IssuanceDate, basic_person::ISSUANCE_DATE),
    (Attribute::Issuer, basic_person::ISSUER),
    (Attribute::DocumentNationality, basic_person::DOCUMENT_NATIONALITY),
    (Attribute::DocumentIssuer, basic_person::DOCUMENT_ISSUER),
];

/// Document kind a schema compiles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    AadhaarQr,
    Passport,
}

/// A versioned circuit input schema. Each variant owns its tree depth,
/// template leaves, update order and public signal layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    AnonAadhaarV1,
    AnonAadhaarV1Legacy,
    PassportV1,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 3] = [
        SchemaVersion::AnonAadhaarV1,
        SchemaVersion::AnonAadhaarV1Legacy,
        SchemaVersion::PassportV1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchemaVersion::AnonAadhaarV1 => "AnonAadhaarV1",
            SchemaVersion::AnonAadhaarV1Legacy => "AnonAadhaarV1Legacy",
            SchemaVersion::PassportV1 => "PassportV1",
        }
    }

    pub fn document(&self) -> DocumentKind {
        match self {
            SchemaVersion::AnonAadhaarV1 | SchemaVersion::AnonAadhaarV1Legacy => DocumentKind::AadhaarQr,
            SchemaVersion::PassportV1 => DocumentKind::Passport,
        }
    }

    /// Template tree depth (`max_levels`), which is also the length of every
    /// sibling array handed to the circuit.
    pub fn depth(&self) -> usize {
        match self {
            SchemaVersion::AnonAadhaarV1 => 9,
            SchemaVersion::AnonAadhaarV1Legacy => 10,
            SchemaVersion::PassportV1 => 13,
        }
    }

    /// Number of public signals the schema's circuit emits.
    pub fn signal_count(&self) -> usize {
        match self {
            SchemaVersion::AnonAadhaarV1 => 12,
            SchemaVersion::AnonAadhaarV1Legacy => 10,
            SchemaVersion::PassportV1 => 6,
        }
    }

    fn constant_table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            SchemaVersion::AnonAadhaarV1 | SchemaVersion::PassportV1 => &basic_person::CONSTANTS,
            SchemaVersion::AnonAadhaarV1Legacy => &anon_aadhaar_legacy::CONSTANTS,
        }
    }

    /// Mutable attributes with their leaf keys, in update order.
    pub fn mutable_table(&self) -> &'static [(Attribute, &'static str)] {
        match self {
            SchemaVersion::AnonAadhaarV1 => &ANON_AADHAAR_V1_LEAVES,
            SchemaVersion::AnonAadhaarV1Legacy => &ANON_AADHAAR_V1_LEGACY_LEAVES,
            SchemaVersion::PassportV1 => &PASSPORT_V1_LEAVES,
        }
    }

    pub fn constant_leaves(&self) -> Result<Vec<TemplateLeaf>> {
        self.constant_table()
            .iter()
            .map(|(key, value)| {
                Ok(TemplateLeaf {
                    key: fr_from_decimal(key)?,
                    value: fr_from_decimal(value)?,
                })
            })
            .collect()
    }

    /// Mutable leaves with zero values, as inserted before compilation.
    pub fn placeholder_leaves(&self) -> Result<Vec<TemplateLeaf>> {
        self.mutable_table()
            .iter()
            .map(|(_, key)| Ok(TemplateLeaf { key: fr_from_decimal(key)?, value: Fr::zero() }))
            .collect()
    }

    /// Arrange attribute values into the schema's update order.
    ///
    /// Every mutable attribute must be supplied exactly once, and nothing
    /// else may be supplied.
    pub fn ordered_leaves(&self, values: &[(Attribute, Fr)]) -> Result<Vec<TemplateLeaf>> {
        let table = self.mutable_table();
        if values.len() != table.len() {
            return Err(CircuitInputError::TreeInvariant(format!(
                "{} expects {} attribute values, got {}",
                self.name(),
                table.len(),
                values.len()
            )));
        }

        table
            .iter()
            .map(|(attribute, key)| {
                let mut matches = values.iter().filter(|(a, _)| a == attribute);
                match (matches.next(), matches.next()) {
                    (Some((_, value)), None) => Ok(TemplateLeaf { key: fr_from_decimal(key)?, value: *value }),
                    (None, _) => Err(CircuitInputError::TreeInvariant(format!(
                        "{} is missing a value for {attribute:?}",
                        self.name()
                    ))),
                    (Some(_), Some(_)) => Err(CircuitInputError::TreeInvariant(format!(
                        "{} got more than one value for {attribute:?}",
                        self.name()
                    ))),
                }
            })
            .collect()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_parse() {
        for schema in SchemaVersion::ALL {
            let constants = schema.constant_leaves().unwrap();
            let placeholders = schema.placeholder_leaves().unwrap();
            assert_eq!(constants.len(), 6);
            assert_eq!(placeholders.len(), schema.mutable_table().len());

            let keys: HashSet<String> = constants
                .iter()
                .chain(placeholders.iter())
                .map(|l| l.key.to_string())
                .collect();
            assert_eq!(keys.len(), constants.len() + placeholders.len(), "{schema} has duplicate keys");

            assert!(constants.len() + placeholders.len() <= 1 << schema.depth());
        }
    }

    #[test]
    fn test_ordered_leaves_follows_schema_order() {
        let schema = SchemaVersion::AnonAadhaarV1Legacy;
        let mut values: Vec<(Attribute, Fr)> = schema
            .mutable_table()
            .iter()
            .enumerate()
            .map(|(i, (attribute, _))| (*attribute, Fr::from(i as u64 + 1)))
            .collect();
        values.reverse();

        let leaves = schema.ordered_leaves(&values).unwrap();
        for (i, leaf) in leaves.iter().enumerate() {
            assert_eq!(leaf.value, Fr::from(i as u64 + 1));
            assert_eq!(leaf.key, fr_from_decimal(schema.mutable_table()[i].1).unwrap());
        }
    }

    #[test]
    fn test_ordered_leaves_rejects_mismatch() {
        let schema = SchemaVersion::PassportV1;
        let err = schema.ordered_leaves(&[(Attribute::Sex, Fr::zero())]).unwrap_err();
        assert!(matches!(err, CircuitInputError::TreeInvariant(_)));

        let mut values: Vec<(Attribute, Fr)> =
            schema.mutable_table().iter().map(|(a, _)| (*a, Fr::zero())).collect();
        values[0].0 = Attribute::Sex;
        let err = schema.ordered_leaves(&values).unwrap_err();
        assert!(err.to_string().contains("missing a value for DateOfBirth"));
    }
}
